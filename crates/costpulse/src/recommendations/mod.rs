//! Neighborhood recommendations: ranking a city's localities for a household.
//!
//! The engine is pure over an immutable metrics snapshot. The service pulls that
//! snapshot from a [`MetricsStore`] and the router exposes it over HTTP.

pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    city_key, AmenityCounts, AqiCategory, DeliveryFlags, FiltersApplied, LocalityId,
    MetricRecord, PropertyType, RankRequest, RentByType,
};
pub use repository::{MetricsStore, SnapshotMetricsStore, StoreError};
pub use router::recommendation_router;
pub use scoring::{
    resolve_weights, ConfigurationError, Factor, FactorScores, FactorWeights, RankedLocality,
    RankingConfig, RankingEngine, RankingOutcome,
};
pub use service::{RecommendationError, RecommendationService};
