use crate::cli::ServeArgs;
use crate::infra::{metrics_store, AppState};
use crate::routes::with_recommendation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use costpulse::config::AppConfig;
use costpulse::error::AppError;
use costpulse::recommendations::{RankingConfig, RecommendationService};
use costpulse::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(snapshot) = args.snapshot.take() {
        config.data.metrics_snapshot = Some(snapshot);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(metrics_store(&config)?);
    let localities = store.len()?;
    match config.data.metrics_snapshot.as_deref() {
        Some(path) => info!(path = %path.display(), localities, "loaded metrics snapshot"),
        None => warn!("no metrics snapshot configured; every city will rank empty"),
    }

    let recommendation_service = Arc::new(RecommendationService::new(
        store,
        RankingConfig::default(),
    ));

    let app = with_recommendation_routes(recommendation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(%addr, "neighborhood scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
