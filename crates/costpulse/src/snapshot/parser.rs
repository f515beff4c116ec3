use super::normalizer::{clean_name, parse_flag};
use super::SnapshotImportError;
use crate::recommendations::domain::{
    AmenityCounts, DeliveryFlags, LocalityId, MetricRecord, RentByType,
};
use serde::{Deserialize, Deserializer};
use std::io::Read;

/// A parsed record and the CSV line it came from.
#[derive(Debug)]
pub(crate) struct SnapshotRecord {
    pub(crate) line: usize,
    pub(crate) record: MetricRecord,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<SnapshotRecord>, SnapshotImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (index, row) in csv_reader.deserialize::<SnapshotRow>().enumerate() {
        let row = row?;
        // Line 1 holds the headers.
        let line = index + 2;
        records.push(SnapshotRecord {
            line,
            record: row.into_record(line)?,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    locality_id: String,
    locality_name: String,
    city: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    latitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    longitude: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rent_1bhk: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rent_2bhk: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    rent_3bhk: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    grocery_cost_monthly: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    aqi_value: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    aqi_category: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    avg_restaurant_rating: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    restaurants_count: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    highly_rated_restaurants: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    grocery_stores_count: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    amenities_score: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    connectivity_score: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    blinkit: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    zomato: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    swiggy: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    hospitals: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    schools: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    parks: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    shopping_malls: Option<String>,
}

impl SnapshotRow {
    fn into_record(self, line: usize) -> Result<MetricRecord, SnapshotImportError> {
        let cell = Cell { line };
        let locality_id = self
            .locality_id
            .parse::<i64>()
            .map_err(|_| cell.invalid("locality_id", &self.locality_id))?;

        let locality_name = clean_name(&self.locality_name);
        if locality_name.is_empty() {
            return Err(SnapshotImportError::invalid_record(
                line,
                "locality_name is empty",
            ));
        }
        let city = clean_name(&self.city);
        if city.is_empty() {
            return Err(SnapshotImportError::invalid_record(line, "city is empty"));
        }

        Ok(MetricRecord {
            locality_id: LocalityId(locality_id),
            locality_name,
            city,
            latitude: cell.number("latitude", self.latitude.as_deref())?,
            longitude: cell.number("longitude", self.longitude.as_deref())?,
            rent: RentByType {
                one_bhk: cell.number("rent_1bhk", self.rent_1bhk.as_deref())?,
                two_bhk: cell.number("rent_2bhk", self.rent_2bhk.as_deref())?,
                three_bhk: cell.number("rent_3bhk", self.rent_3bhk.as_deref())?,
            },
            grocery_cost_monthly: cell
                .number("grocery_cost_monthly", self.grocery_cost_monthly.as_deref())?,
            aqi_value: cell.number("aqi_value", self.aqi_value.as_deref())?,
            aqi_category: self.aqi_category.map(|category| clean_name(&category)),
            avg_restaurant_rating: cell
                .number("avg_restaurant_rating", self.avg_restaurant_rating.as_deref())?,
            restaurants_count: cell.count("restaurants_count", self.restaurants_count.as_deref())?,
            highly_rated_restaurants: cell.count(
                "highly_rated_restaurants",
                self.highly_rated_restaurants.as_deref(),
            )?,
            grocery_stores_count: cell
                .count("grocery_stores_count", self.grocery_stores_count.as_deref())?,
            amenities_score: cell
                .number("amenities_score", self.amenities_score.as_deref())?
                .unwrap_or(0.0),
            connectivity_score: cell
                .number("connectivity_score", self.connectivity_score.as_deref())?
                .unwrap_or(0.0),
            delivery: DeliveryFlags {
                blinkit: cell.flag("blinkit", self.blinkit.as_deref())?,
                zomato: cell.flag("zomato", self.zomato.as_deref())?,
                swiggy: cell.flag("swiggy", self.swiggy.as_deref())?,
            },
            amenity_counts: AmenityCounts {
                hospitals: cell.count("hospitals", self.hospitals.as_deref())?,
                schools: cell.count("schools", self.schools.as_deref())?,
                parks: cell.count("parks", self.parks.as_deref())?,
                shopping_malls: cell.count("shopping_malls", self.shopping_malls.as_deref())?,
            },
        })
    }
}

#[derive(Clone, Copy)]
struct Cell {
    line: usize,
}

impl Cell {
    fn invalid(self, column: &str, value: &str) -> SnapshotImportError {
        SnapshotImportError::invalid_record(
            self.line,
            format!("{column} has unreadable value '{value}'"),
        )
    }

    fn number(self, column: &str, value: Option<&str>) -> Result<Option<f64>, SnapshotImportError> {
        value
            .map(|raw| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|parsed| parsed.is_finite())
                    .ok_or_else(|| self.invalid(column, raw))
            })
            .transpose()
    }

    fn count(self, column: &str, value: Option<&str>) -> Result<u32, SnapshotImportError> {
        match value {
            Some(raw) => raw.parse::<u32>().map_err(|_| self.invalid(column, raw)),
            None => Ok(0),
        }
    }

    fn flag(self, column: &str, value: Option<&str>) -> Result<bool, SnapshotImportError> {
        match value {
            Some(raw) => parse_flag(raw).ok_or_else(|| self.invalid(column, raw)),
            None => Ok(false),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
