use std::collections::BTreeMap;
use std::sync::Arc;

use costpulse::recommendations::{
    ConfigurationError, PropertyType, RankRequest, RankingConfig, RankingEngine,
    RecommendationError, RecommendationService, SnapshotMetricsStore,
};
use costpulse::snapshot::MetricSnapshotImporter;

fn sample_service() -> RecommendationService<SnapshotMetricsStore> {
    let data = include_bytes!("../../../data/bhopal_localities.csv");
    let records = MetricSnapshotImporter::from_reader(&data[..]).expect("sample snapshot imports");
    RecommendationService::new(
        Arc::new(SnapshotMetricsStore::from_records(records)),
        RankingConfig::default(),
    )
}

#[test]
fn household_ranking_over_the_sample_city() {
    let service = sample_service();
    let request = RankRequest::new("Bhopal", 3, 22000.0)
        .with_property_type(PropertyType::TwoBhk)
        .with_top_n(5);

    let outcome = service.recommend(&request).expect("bhopal ranks");

    assert_eq!(outcome.total_neighborhoods, 5);
    assert_eq!(outcome.candidates_considered, 10);
    assert!(outcome
        .recommendations
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
    for locality in &outcome.recommendations {
        let grocery = locality.grocery_cost.unwrap_or(4500.0);
        assert!((locality.total_monthly_cost - (locality.rent + grocery * 3.0)).abs() < 1e-6);
        assert_eq!(locality.over_budget, locality.total_monthly_cost > 22000.0);
        if locality.over_budget {
            assert_eq!(locality.score, locality.base_score * 0.5);
        } else {
            assert_eq!(locality.score, locality.base_score);
        }
    }
}

#[test]
fn missing_data_is_reported_not_hidden() {
    let service = sample_service();
    let request = RankRequest::new("Bhopal", 1, 30000.0).with_top_n(50);

    let outcome = service.recommend(&request).expect("bhopal ranks");

    let misrod = outcome
        .recommendations
        .iter()
        .find(|locality| locality.locality_name == "Misrod")
        .expect("Misrod ranked");
    assert_eq!(misrod.grocery_cost, None);
    assert_eq!(misrod.hygiene_rating, None);
    assert_eq!(misrod.normalized_scores.hygiene, 0.0);
    assert_eq!(misrod.aqi_category.as_deref(), Some("Good"));

    let hoshangabad = outcome
        .recommendations
        .iter()
        .find(|locality| locality.locality_name == "Hoshangabad Road")
        .expect("Hoshangabad Road ranked");
    assert_eq!(hoshangabad.aqi, 50.0);
}

#[test]
fn custom_weights_reorder_the_city() {
    let service = sample_service();
    let mut weights = BTreeMap::new();
    for key in [
        "rent",
        "grocery_cost",
        "delivery_availability",
        "aqi",
        "hygiene",
        "amenities",
    ] {
        weights.insert(key.to_string(), 0.0);
    }
    weights.insert("connectivity".to_string(), 1.0);
    let request = RankRequest::new("Bhopal", 1, 100000.0).with_weights(weights);

    let outcome = service.recommend(&request).expect("bhopal ranks");

    assert_eq!(outcome.recommendations[0].locality_name, "MP Nagar");
    assert!((outcome.recommendations[0].score - 0.91).abs() < 1e-9);
}

#[test]
fn zero_weight_configuration_is_rejected() {
    let service = sample_service();
    let weights: BTreeMap<String, f64> = [
        "rent",
        "grocery_cost",
        "delivery_availability",
        "aqi",
        "hygiene",
        "amenities",
        "connectivity",
    ]
    .into_iter()
    .map(|key| (key.to_string(), 0.0))
    .collect();

    match service.recommend(&RankRequest::new("Bhopal", 2, 20000.0).with_weights(weights)) {
        Err(RecommendationError::Configuration(ConfigurationError::NonPositiveWeightSum {
            sum,
        })) => assert_eq!(sum, 0.0),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn engine_is_usable_without_a_store() {
    let data = include_bytes!("../../../data/bhopal_localities.csv");
    let records = MetricSnapshotImporter::from_reader(&data[..]).expect("sample snapshot imports");
    let engine = RankingEngine::default();

    let outcome = engine
        .rank(&records, &RankRequest::new(" INDORE ", 2, 30000.0))
        .expect("indore ranks");

    assert_eq!(outcome.total_neighborhoods, 3);
    assert!(outcome
        .recommendations
        .iter()
        .all(|locality| locality.city == "Indore"));
}
