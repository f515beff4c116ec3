//! CSV import of aggregated locality metrics.

mod normalizer;
mod parser;

use crate::recommendations::domain::{city_key, LocalityId, MetricRecord};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use parser::SnapshotRecord;

#[derive(Debug)]
pub enum SnapshotImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRecord { line: usize, reason: String },
}

impl SnapshotImportError {
    pub(crate) fn invalid_record(line: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for SnapshotImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotImportError::Io(err) => write!(f, "failed to read metrics snapshot: {}", err),
            SnapshotImportError::Csv(err) => write!(f, "invalid metrics snapshot CSV: {}", err),
            SnapshotImportError::InvalidRecord { line, reason } => {
                write!(f, "invalid locality record on line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for SnapshotImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotImportError::Io(err) => Some(err),
            SnapshotImportError::Csv(err) => Some(err),
            SnapshotImportError::InvalidRecord { .. } => None,
        }
    }
}

impl From<std::io::Error> for SnapshotImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SnapshotImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct MetricSnapshotImporter;

impl MetricSnapshotImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<MetricRecord>, SnapshotImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<MetricRecord>, SnapshotImportError> {
        let mut seen: HashSet<(String, LocalityId)> = HashSet::new();
        let mut records = Vec::new();

        for parsed in parser::parse_records(reader)? {
            validate_record(&parsed)?;

            let key = (city_key(&parsed.record.city), parsed.record.locality_id);
            if !seen.insert(key) {
                return Err(SnapshotImportError::invalid_record(
                    parsed.line,
                    format!(
                        "locality_id {} appears more than once for {}",
                        parsed.record.locality_id, parsed.record.city
                    ),
                ));
            }

            records.push(parsed.record);
        }

        Ok(records)
    }
}

fn validate_record(parsed: &SnapshotRecord) -> Result<(), SnapshotImportError> {
    let record = &parsed.record;
    let non_negative = [
        ("rent_1bhk", record.rent.one_bhk),
        ("rent_2bhk", record.rent.two_bhk),
        ("rent_3bhk", record.rent.three_bhk),
        ("grocery_cost_monthly", record.grocery_cost_monthly),
        ("aqi_value", record.aqi_value),
        ("avg_restaurant_rating", record.avg_restaurant_rating),
    ];
    for (column, value) in non_negative {
        if let Some(value) = value.filter(|value| *value < 0.0) {
            return Err(SnapshotImportError::invalid_record(
                parsed.line,
                format!("{column} must not be negative, got {value}"),
            ));
        }
    }

    for (column, value) in [
        ("amenities_score", record.amenities_score),
        ("connectivity_score", record.connectivity_score),
    ] {
        if !(0.0..=10.0).contains(&value) {
            return Err(SnapshotImportError::invalid_record(
                parsed.line,
                format!("{column} must be within 0-10, got {value}"),
            ));
        }
    }

    Ok(())
}
