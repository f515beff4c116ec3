use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use super::domain::{city_key, MetricRecord};

/// Read access to the aggregated locality metrics.
///
/// Implementations hand out owned copies so a ranking pass never observes a
/// snapshot that changes underneath it.
pub trait MetricsStore: Send + Sync {
    fn localities_for_city(&self, city: &str) -> Result<Vec<MetricRecord>, StoreError>;
    fn cities(&self) -> Result<Vec<String>, StoreError>;
}

/// Error enumeration for metrics store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("metrics store unavailable: {0}")]
    Unavailable(String),
}

/// In-memory store over an immutable snapshot, swapped wholesale on reload.
#[derive(Debug, Default)]
pub struct SnapshotMetricsStore {
    snapshot: RwLock<Arc<Vec<MetricRecord>>>,
}

impl SnapshotMetricsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<MetricRecord>) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(records)),
        }
    }

    /// Replace the whole snapshot. Readers holding the previous one keep it.
    pub fn replace(&self, records: Vec<MetricRecord>) -> Result<(), StoreError> {
        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_string()))?;
        *guard = Arc::new(records);
        Ok(())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.current()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.current()?.is_empty())
    }

    fn current(&self) -> Result<Arc<Vec<MetricRecord>>, StoreError> {
        self.snapshot
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_string()))
    }
}

impl MetricsStore for SnapshotMetricsStore {
    fn localities_for_city(&self, city: &str) -> Result<Vec<MetricRecord>, StoreError> {
        let wanted = city_key(city);
        Ok(self
            .current()?
            .iter()
            .filter(|record| city_key(&record.city) == wanted)
            .cloned()
            .collect())
    }

    fn cities(&self) -> Result<Vec<String>, StoreError> {
        let snapshot = self.current()?;
        let mut seen = BTreeSet::new();
        let mut cities = Vec::new();
        for record in snapshot.iter() {
            if seen.insert(city_key(&record.city)) {
                cities.push(record.city.split_whitespace().collect::<Vec<_>>().join(" "));
            }
        }
        cities.sort_by_key(|city| city.to_lowercase());
        Ok(cities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_spacing() {
        let store = SnapshotMetricsStore::from_records(vec![
            MetricRecord::bare(1, "Arera Colony", "Bhopal"),
            MetricRecord::bare(2, "Vijay Nagar", "Indore"),
            MetricRecord::bare(3, "MP Nagar", " bhopal "),
        ]);

        let bhopal = store.localities_for_city("BHOPAL").expect("lookup");
        assert_eq!(bhopal.len(), 2);
        assert!(store.localities_for_city("Pune").expect("lookup").is_empty());
    }

    #[test]
    fn cities_are_distinct_and_sorted() {
        let store = SnapshotMetricsStore::from_records(vec![
            MetricRecord::bare(1, "Vijay Nagar", "Indore"),
            MetricRecord::bare(2, "Arera Colony", "Bhopal"),
            MetricRecord::bare(3, "MP Nagar", "bhopal"),
        ]);

        assert_eq!(store.cities().expect("cities"), vec!["Bhopal", "Indore"]);
    }

    #[test]
    fn replace_swaps_the_snapshot() {
        let store = SnapshotMetricsStore::new();
        assert!(store.is_empty().expect("len"));

        let before = store.current().expect("snapshot");
        store
            .replace(vec![MetricRecord::bare(1, "Arera Colony", "Bhopal")])
            .expect("replace");

        assert_eq!(store.len().expect("len"), 1);
        assert!(before.is_empty());
    }
}
