use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::RankRequest;
use super::repository::{MetricsStore, StoreError};
use super::scoring::{ConfigurationError, RankingConfig, RankingEngine, RankingOutcome};

/// Service composing the metrics store and the ranking engine.
pub struct RecommendationService<S> {
    store: Arc<S>,
    engine: Arc<RankingEngine>,
}

impl<S> RecommendationService<S>
where
    S: MetricsStore + 'static,
{
    pub fn new(store: Arc<S>, config: RankingConfig) -> Self {
        Self {
            store,
            engine: Arc::new(RankingEngine::new(config)),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Rank the requested city against a fresh copy of its metrics.
    pub fn recommend(
        &self,
        request: &RankRequest,
    ) -> Result<RankingOutcome, RecommendationError> {
        let records = self.store.localities_for_city(&request.city)?;

        let outcome = match self.engine.rank(&records, request) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(city = %request.city, %error, "rejected weight configuration");
                return Err(error.into());
            }
        };

        let dropped = records.len().saturating_sub(outcome.candidates_considered);
        if dropped > 0 {
            debug!(
                city = %request.city,
                dropped,
                "ignored duplicate locality records"
            );
        }

        info!(
            city = %request.city,
            candidates = outcome.candidates_considered,
            returned = outcome.total_neighborhoods,
            "ranked neighborhoods"
        );

        Ok(outcome)
    }

    /// Cities with at least one locality in the store.
    pub fn cities(&self) -> Result<Vec<String>, RecommendationError> {
        Ok(self.store.cities()?)
    }
}

/// Error raised by the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
