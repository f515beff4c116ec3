use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use serde_json::Value;

use crate::recommendations::domain::{DeliveryFlags, MetricRecord, RankRequest, RentByType};
use crate::recommendations::repository::{MetricsStore, SnapshotMetricsStore, StoreError};
use crate::recommendations::{
    recommendation_router, RankingConfig, RankingEngine, RecommendationService,
};

pub(super) fn ranking_engine() -> RankingEngine {
    RankingEngine::new(RankingConfig::default())
}

/// Locality with a 2BHK rent and every other metric populated.
pub(super) fn locality(
    locality_id: i64,
    locality_name: &str,
    rent_2bhk: f64,
    grocery: f64,
    aqi: f64,
    rating: f64,
) -> MetricRecord {
    MetricRecord {
        rent: RentByType {
            one_bhk: Some(rent_2bhk * 0.7),
            two_bhk: Some(rent_2bhk),
            three_bhk: Some(rent_2bhk * 1.4),
        },
        grocery_cost_monthly: Some(grocery),
        aqi_value: Some(aqi),
        avg_restaurant_rating: Some(rating),
        amenities_score: 5.0,
        connectivity_score: 5.0,
        delivery: DeliveryFlags::ALL,
        ..MetricRecord::bare(locality_id, locality_name, "Bhopal")
    }
}

/// The two-locality Bhopal city used throughout the ranking tests.
pub(super) fn bhopal_pair() -> Vec<MetricRecord> {
    let arera = MetricRecord {
        amenities_score: 6.0,
        connectivity_score: 5.0,
        ..locality(101, "Arera Colony", 10000.0, 4000.0, 40.0, 4.2)
    };
    let kolar = MetricRecord {
        amenities_score: 3.0,
        connectivity_score: 3.0,
        delivery: DeliveryFlags::default(),
        ..locality(102, "Kolar Road", 15000.0, 5000.0, 80.0, 0.0)
    };
    vec![arera, kolar]
}

pub(super) fn bhopal_request() -> RankRequest {
    RankRequest::new("Bhopal", 3, 20000.0)
}

/// `count` localities whose rent rises with their id.
pub(super) fn rising_rent_city(count: i64) -> Vec<MetricRecord> {
    (1..=count)
        .map(|id| {
            locality(
                id,
                &format!("Sector {id}"),
                8000.0 + 500.0 * id as f64,
                4500.0,
                60.0 + id as f64,
                3.5,
            )
        })
        .collect()
}

pub(super) fn zero_weights() -> BTreeMap<String, f64> {
    [
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
    .collect()
}

pub(super) fn build_service() -> (
    RecommendationService<SnapshotMetricsStore>,
    Arc<SnapshotMetricsStore>,
) {
    let mut snapshot = bhopal_pair();
    snapshot.push(MetricRecord {
        city: "Indore".to_string(),
        ..locality(201, "Vijay Nagar", 18000.0, 5000.0, 95.0, 4.4)
    });
    let store = Arc::new(SnapshotMetricsStore::from_records(snapshot));
    let service = RecommendationService::new(store.clone(), RankingConfig::default());
    (service, store)
}

pub(super) fn router_with_service(
    service: RecommendationService<SnapshotMetricsStore>,
) -> Router {
    recommendation_router(Arc::new(service))
}

pub(super) struct UnavailableStore;

impl MetricsStore for UnavailableStore {
    fn localities_for_city(&self, _city: &str) -> Result<Vec<MetricRecord>, StoreError> {
        Err(StoreError::Unavailable("warehouse offline".to_string()))
    }

    fn cities(&self) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("warehouse offline".to_string()))
    }
}

pub(super) fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
