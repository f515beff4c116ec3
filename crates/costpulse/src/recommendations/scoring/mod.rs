mod budget;
mod config;
mod normalizer;
mod weights;

pub use budget::{BudgetAdjuster, BudgetOutcome};
pub use config::{RankingConfig, FALLBACK_GROCERY_COST};
pub use normalizer::{
    delivery_share, lower_is_better, normalize_pool, out_of_ten, rated_subset, CandidateMetrics,
    DegenerateRange, FactorScores,
};
pub use weights::{resolve_weights, ConfigurationError, Factor, FactorWeights};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{
    city_key, AmenityCounts, AqiCategory, DeliveryFlags, FiltersApplied, LocalityId,
    MetricRecord, PropertyType, RankRequest,
};

/// Stateless engine ranking a city's localities against a household request.
///
/// Pure over its inputs: the caller owns the snapshot and may share one engine
/// across concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct RankingEngine {
    config: RankingConfig,
}

impl RankingEngine {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Rank the localities of `request.city` found in `snapshot`, best first.
    ///
    /// Ties keep snapshot order. A city with no records yields an empty,
    /// successful outcome; only an unusable weight map is an error.
    pub fn rank(
        &self,
        snapshot: &[MetricRecord],
        request: &RankRequest,
    ) -> Result<RankingOutcome, ConfigurationError> {
        let weights = resolve_weights(request.weights.as_ref())?;
        let budget = request.effective_budget();
        let top_n = self.config.effective_top_n(request.top_n);
        let filters_applied = FiltersApplied {
            city: request.city.clone(),
            number_of_people: request.household_size(),
            max_travel_distance_km: request.effective_travel_distance_km(),
            budget,
            property_type: request.property_type,
            weights: request.weights.clone().unwrap_or_default(),
            top_n,
        };

        let pool = candidate_pool(snapshot, &request.city);
        if pool.is_empty() {
            return Ok(RankingOutcome {
                recommendations: Vec::new(),
                total_neighborhoods: 0,
                candidates_considered: 0,
                filters_applied,
            });
        }

        let metrics: Vec<CandidateMetrics> = pool
            .iter()
            .map(|record| self.fill_defaults(record, request.property_type))
            .collect();
        let normalized = normalize_pool(&metrics, budget, &self.config);
        let adjuster = BudgetAdjuster::new(
            budget,
            request.household_size(),
            self.config.budget_penalty_multiplier,
        );

        let mut recommendations: Vec<RankedLocality> = pool
            .iter()
            .zip(metrics.iter())
            .zip(normalized)
            .map(|((record, raw), scores)| {
                let base_score = weights
                    .iter()
                    .map(|(factor, weight)| weight * scores.get(factor))
                    .sum::<f64>();
                let budget_outcome = adjuster.apply(base_score, raw.rent, raw.grocery_cost);
                RankedLocality::build(record, raw, scores, base_score, budget_outcome)
            })
            .collect();

        // `sort_by` is stable, so equal scores keep snapshot order.
        recommendations.sort_by(|a, b| b.score.total_cmp(&a.score));
        recommendations.truncate(top_n);

        Ok(RankingOutcome {
            total_neighborhoods: recommendations.len(),
            candidates_considered: pool.len(),
            recommendations,
            filters_applied,
        })
    }

    fn fill_defaults(&self, record: &MetricRecord, property_type: PropertyType) -> CandidateMetrics {
        CandidateMetrics {
            rent: record
                .rent
                .for_type(property_type)
                .filter(|rent| rent.is_finite())
                .unwrap_or(0.0),
            grocery_cost: reported_grocery_cost(record)
                .unwrap_or_else(|| self.config.grocery_default_for(&record.city)),
            aqi: record
                .aqi_value
                .filter(|aqi| aqi.is_finite())
                .unwrap_or(self.config.default_aqi),
            restaurant_rating: reported_rating(record).unwrap_or(0.0),
            amenities_score: finite_or_zero(record.amenities_score),
            connectivity_score: finite_or_zero(record.connectivity_score),
            deliveries_available: record.delivery.available_count(),
        }
    }
}

/// Records of `city` in snapshot order, keeping the first record per locality.
pub fn candidate_pool<'a>(snapshot: &'a [MetricRecord], city: &str) -> Vec<&'a MetricRecord> {
    let wanted = city_key(city);
    let mut seen = HashSet::new();
    snapshot
        .iter()
        .filter(|record| city_key(&record.city) == wanted)
        .filter(|record| seen.insert(record.locality_id))
        .collect()
}

fn reported_grocery_cost(record: &MetricRecord) -> Option<f64> {
    record
        .grocery_cost_monthly
        .filter(|cost| cost.is_finite() && *cost > 0.0)
}

fn reported_rating(record: &MetricRecord) -> Option<f64> {
    record
        .avg_restaurant_rating
        .filter(|rating| rating.is_finite() && *rating > 0.0)
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// One ranked locality with the raw values and per-factor scores behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLocality {
    pub locality_id: LocalityId,
    pub locality_name: String,
    pub city: String,
    /// Final score after the budget penalty.
    pub score: f64,
    /// Weighted composite before the budget penalty.
    pub base_score: f64,
    pub over_budget: bool,
    pub rent: f64,
    /// `None` when the city default stood in for missing data.
    pub grocery_cost: Option<f64>,
    pub total_monthly_cost: f64,
    pub aqi: f64,
    pub aqi_category: Option<String>,
    /// `None` when no rated restaurants exist nearby.
    pub hygiene_rating: Option<f64>,
    pub amenities_score: f64,
    pub connectivity_score: f64,
    pub delivery_services: DeliveryFlags,
    pub amenity_counts: AmenityCounts,
    pub restaurants_count: u32,
    pub highly_rated_restaurants: u32,
    pub grocery_stores_count: u32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub normalized_scores: FactorScores,
}

impl RankedLocality {
    fn build(
        record: &MetricRecord,
        raw: &CandidateMetrics,
        scores: FactorScores,
        base_score: f64,
        budget: BudgetOutcome,
    ) -> Self {
        let aqi_category = record.aqi_category.clone().or_else(|| {
            record
                .aqi_value
                .filter(|aqi| aqi.is_finite())
                .map(|aqi| AqiCategory::from_reading(aqi).label().to_string())
        });

        Self {
            locality_id: record.locality_id,
            locality_name: record.locality_name.clone(),
            city: record.city.clone(),
            score: budget.final_score,
            base_score,
            over_budget: budget.over_budget,
            rent: raw.rent,
            grocery_cost: reported_grocery_cost(record),
            total_monthly_cost: budget.total_monthly_cost,
            aqi: raw.aqi,
            aqi_category,
            hygiene_rating: reported_rating(record),
            amenities_score: raw.amenities_score,
            connectivity_score: raw.connectivity_score,
            delivery_services: record.delivery,
            amenity_counts: record.amenity_counts,
            restaurants_count: record.restaurants_count,
            highly_rated_restaurants: record.highly_rated_restaurants,
            grocery_stores_count: record.grocery_stores_count,
            latitude: record.latitude,
            longitude: record.longitude,
            normalized_scores: scores,
        }
    }
}

/// Ranking result in the shape returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingOutcome {
    pub recommendations: Vec<RankedLocality>,
    /// Number of recommendations returned.
    pub total_neighborhoods: usize,
    /// Size of the candidate pool the scores were normalized against.
    pub candidates_considered: usize,
    pub filters_applied: FiltersApplied,
}
