use costpulse::config::AppConfig;
use costpulse::error::AppError;
use costpulse::recommendations::{MetricRecord, SnapshotMetricsStore};
use costpulse::snapshot::MetricSnapshotImporter;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Sample snapshot compiled into the binary for demos and first runs.
pub(crate) const SAMPLE_SNAPSHOT: &str = include_str!("../../../data/bhopal_localities.csv");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn sample_records() -> Result<Vec<MetricRecord>, AppError> {
    MetricSnapshotImporter::from_reader(SAMPLE_SNAPSHOT.as_bytes()).map_err(AppError::from)
}

pub(crate) fn load_records(path: &Path) -> Result<Vec<MetricRecord>, AppError> {
    MetricSnapshotImporter::from_path(path).map_err(AppError::from)
}

/// Build the metrics store the server ranks against.
///
/// Without a configured snapshot the store starts empty and every city ranks
/// to an empty list.
pub(crate) fn metrics_store(config: &AppConfig) -> Result<SnapshotMetricsStore, AppError> {
    match config.data.metrics_snapshot.as_deref() {
        Some(path) => Ok(SnapshotMetricsStore::from_records(load_records(path)?)),
        None => Ok(SnapshotMetricsStore::new()),
    }
}
