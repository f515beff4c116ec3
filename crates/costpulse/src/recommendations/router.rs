use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::RankRequest;
use super::repository::MetricsStore;
use super::service::{RecommendationError, RecommendationService};

/// Router builder exposing the neighborhood ranking endpoints.
pub fn recommendation_router<S>(service: Arc<RecommendationService<S>>) -> Router
where
    S: MetricsStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/recommendations/neighborhoods",
            post(neighborhoods_handler::<S>),
        )
        .route("/api/v1/recommendations/cities", get(cities_handler::<S>))
        .with_state(service)
}

pub(crate) async fn neighborhoods_handler<S>(
    State(service): State<Arc<RecommendationService<S>>>,
    axum::Json(request): axum::Json<RankRequest>,
) -> Response
where
    S: MetricsStore + 'static,
{
    match service.recommend(&request) {
        Ok(outcome) => {
            let payload = json!({
                "recommendations": outcome.recommendations,
                "total_neighborhoods": outcome.total_neighborhoods,
                "filters_applied": outcome.filters_applied,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn cities_handler<S>(
    State(service): State<Arc<RecommendationService<S>>>,
) -> Response
where
    S: MetricsStore + 'static,
{
    match service.cities() {
        Ok(cities) => (StatusCode::OK, axum::Json(json!({ "cities": cities }))).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: RecommendationError) -> Response {
    match error {
        RecommendationError::Configuration(error) => {
            let payload = json!({
                "error": error.to_string(),
                "kind": "configuration",
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        RecommendationError::Store(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
    }
}
