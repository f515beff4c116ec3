use costpulse::recommendations::{LocalityId, MetricsStore, SnapshotMetricsStore};
use costpulse::snapshot::{MetricSnapshotImporter, SnapshotImportError};

#[test]
fn importer_handles_the_bundled_snapshot() {
    let data = include_bytes!("../../../data/bhopal_localities.csv");

    let records = MetricSnapshotImporter::from_reader(&data[..]).expect("sample snapshot imports");

    assert_eq!(records.len(), 13);
    let shahpura = records
        .iter()
        .find(|record| record.locality_id == LocalityId(4))
        .expect("Shahpura present");
    assert_eq!(shahpura.locality_name, "Shahpura");
    assert_eq!(shahpura.grocery_cost_monthly, None);
    assert_eq!(shahpura.rent.two_bhk, Some(13000.0));
    assert!(!shahpura.delivery.blinkit);
    assert_eq!(shahpura.amenity_counts.parks, 5);

    let hoshangabad = records
        .iter()
        .find(|record| record.locality_id == LocalityId(6))
        .expect("Hoshangabad Road present");
    assert_eq!(hoshangabad.aqi_value, None);
    assert_eq!(hoshangabad.aqi_category, None);
}

#[test]
fn imported_snapshot_feeds_the_store() {
    let data = include_bytes!("../../../data/bhopal_localities.csv");
    let records = MetricSnapshotImporter::from_reader(&data[..]).expect("sample snapshot imports");

    let store = SnapshotMetricsStore::from_records(records);

    assert_eq!(store.cities().expect("cities"), vec!["Bhopal", "Indore"]);
    assert_eq!(store.localities_for_city("indore").expect("lookup").len(), 3);
}

#[test]
fn importer_names_the_offending_line() {
    let csv = "locality_id,locality_name,city,aqi_value\n\
1,Arera Colony,Bhopal,62\n\
2,MP Nagar,Bhopal,-4\n";

    let error = MetricSnapshotImporter::from_reader(csv.as_bytes()).expect_err("negative aqi");

    match &error {
        SnapshotImportError::InvalidRecord { line, reason } => {
            assert_eq!(*line, 3);
            assert!(reason.contains("aqi_value"));
        }
        other => panic!("expected invalid record, got {other:?}"),
    }
    assert!(error.to_string().contains("line 3"));
}
