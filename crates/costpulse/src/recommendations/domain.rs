use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for a locality within a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalityId(pub i64);

impl fmt::Display for LocalityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit layouts the rent columns are tracked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum PropertyType {
    #[serde(rename = "1BHK")]
    OneBhk,
    #[default]
    #[serde(rename = "2BHK")]
    TwoBhk,
    #[serde(rename = "3BHK")]
    ThreeBhk,
}

impl PropertyType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneBhk => "1BHK",
            Self::TwoBhk => "2BHK",
            Self::ThreeBhk => "3BHK",
        }
    }

    /// Parse a caller supplied layout; anything unrecognized ranks as 2BHK.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().replace(' ', "").as_str() {
            "1BHK" => Self::OneBhk,
            "3BHK" => Self::ThreeBhk,
            _ => Self::TwoBhk,
        }
    }
}

impl<'de> Deserialize<'de> for PropertyType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// Average monthly rent per layout. `None` means no listings were observed yet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RentByType {
    #[serde(default)]
    pub one_bhk: Option<f64>,
    #[serde(default)]
    pub two_bhk: Option<f64>,
    #[serde(default)]
    pub three_bhk: Option<f64>,
}

impl RentByType {
    pub fn for_type(&self, property_type: PropertyType) -> Option<f64> {
        match property_type {
            PropertyType::OneBhk => self.one_bhk,
            PropertyType::TwoBhk => self.two_bhk,
            PropertyType::ThreeBhk => self.three_bhk,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeliveryFlags {
    #[serde(default)]
    pub blinkit: bool,
    #[serde(default)]
    pub zomato: bool,
    #[serde(default)]
    pub swiggy: bool,
}

impl DeliveryFlags {
    pub const ALL: Self = Self {
        blinkit: true,
        zomato: true,
        swiggy: true,
    };

    pub fn available_count(&self) -> u8 {
        [self.blinkit, self.zomato, self.swiggy]
            .into_iter()
            .filter(|available| *available)
            .count() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AmenityCounts {
    #[serde(default)]
    pub hospitals: u32,
    #[serde(default)]
    pub schools: u32,
    #[serde(default)]
    pub parks: u32,
    #[serde(default, rename = "malls", alias = "shopping_malls")]
    pub shopping_malls: u32,
}

/// Aggregated snapshot of one locality's scraped and derived metrics.
///
/// Produced by the aggregation pipeline and treated as read-only here. Every
/// optional field may be absent; ranking substitutes documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub locality_id: LocalityId,
    pub locality_name: String,
    pub city: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub rent: RentByType,
    #[serde(default)]
    pub grocery_cost_monthly: Option<f64>,
    #[serde(default)]
    pub aqi_value: Option<f64>,
    #[serde(default)]
    pub aqi_category: Option<String>,
    /// Zero or absent both mean "no rated restaurants", never a rating of zero.
    #[serde(default)]
    pub avg_restaurant_rating: Option<f64>,
    #[serde(default)]
    pub restaurants_count: u32,
    #[serde(default)]
    pub highly_rated_restaurants: u32,
    #[serde(default)]
    pub grocery_stores_count: u32,
    /// Pre-normalized to 0-10 upstream.
    #[serde(default)]
    pub amenities_score: f64,
    /// Pre-normalized to 0-10 upstream.
    #[serde(default)]
    pub connectivity_score: f64,
    #[serde(default)]
    pub delivery: DeliveryFlags,
    #[serde(default)]
    pub amenity_counts: AmenityCounts,
}

impl MetricRecord {
    /// A record with only its identity populated.
    pub fn bare(locality_id: i64, locality_name: &str, city: &str) -> Self {
        Self {
            locality_id: LocalityId(locality_id),
            locality_name: locality_name.to_string(),
            city: city.to_string(),
            latitude: None,
            longitude: None,
            rent: RentByType::default(),
            grocery_cost_monthly: None,
            aqi_value: None,
            aqi_category: None,
            avg_restaurant_rating: None,
            restaurants_count: 0,
            highly_rated_restaurants: 0,
            grocery_stores_count: 0,
            amenities_score: 0.0,
            connectivity_score: 0.0,
            delivery: DeliveryFlags::default(),
            amenity_counts: AmenityCounts::default(),
        }
    }
}

/// Caller request for a ranked list of localities in one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRequest {
    pub city: String,
    #[serde(default, deserialize_with = "saturating_count")]
    pub number_of_people: u32,
    /// Accepted and echoed; no travel-time source exists to filter on.
    #[serde(default)]
    pub max_travel_distance_km: f64,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub property_type: PropertyType,
    #[serde(default)]
    pub weights: Option<BTreeMap<String, f64>>,
    #[serde(default, deserialize_with = "saturating_optional_count")]
    pub top_n: Option<usize>,
}

/// Largest household the cost model prices groceries for.
pub const MAX_HOUSEHOLD_SIZE: u32 = 10;

impl RankRequest {
    pub fn new(city: impl Into<String>, number_of_people: u32, budget: f64) -> Self {
        Self {
            city: city.into(),
            number_of_people,
            max_travel_distance_km: 0.0,
            budget,
            property_type: PropertyType::default(),
            weights: None,
            top_n: None,
        }
    }

    pub fn with_property_type(mut self, property_type: PropertyType) -> Self {
        self.property_type = property_type;
        self
    }

    pub fn with_weights(mut self, weights: BTreeMap<String, f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    pub fn with_max_travel_distance_km(mut self, km: f64) -> Self {
        self.max_travel_distance_km = km;
        self
    }

    /// Household size used for costing, clamped to `1..=MAX_HOUSEHOLD_SIZE`.
    pub fn household_size(&self) -> u32 {
        self.number_of_people.clamp(1, MAX_HOUSEHOLD_SIZE)
    }

    /// Budget used for costing; negative or non-finite budgets become zero.
    pub fn effective_budget(&self) -> f64 {
        if self.budget.is_finite() && self.budget > 0.0 {
            self.budget
        } else {
            0.0
        }
    }

    pub fn effective_travel_distance_km(&self) -> f64 {
        if self.max_travel_distance_km.is_finite() {
            self.max_travel_distance_km.clamp(0.0, 50.0)
        } else {
            0.0
        }
    }
}

/// Read a count leniently: negatives become zero, fractions are truncated and
/// oversized values saturate.
fn saturating_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(saturate(raw.unwrap_or(0.0), u64::from(u32::MAX)) as u32)
}

fn saturating_optional_count<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.map(|value| saturate(value, usize::MAX as u64) as usize))
}

fn saturate(value: f64, max: u64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        // `as` saturates float to integer conversions.
        (value as u64).min(max)
    }
}

/// Echo of the effective request parameters returned with every ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiltersApplied {
    pub city: String,
    pub number_of_people: u32,
    pub max_travel_distance_km: f64,
    pub budget: f64,
    pub property_type: PropertyType,
    pub weights: BTreeMap<String, f64>,
    pub top_n: usize,
}

/// US EPA style AQI bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_reading(aqi: f64) -> Self {
        if aqi <= 50.0 {
            Self::Good
        } else if aqi <= 100.0 {
            Self::Moderate
        } else if aqi <= 150.0 {
            Self::UnhealthyForSensitiveGroups
        } else if aqi <= 200.0 {
            Self::Unhealthy
        } else if aqi <= 300.0 {
            Self::VeryUnhealthy
        } else {
            Self::Hazardous
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

/// Comparison key for city names: whitespace collapsed, case folded.
pub fn city_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_falls_back_to_two_bhk() {
        assert_eq!(PropertyType::parse_lenient("1bhk"), PropertyType::OneBhk);
        assert_eq!(PropertyType::parse_lenient(" 3 BHK "), PropertyType::ThreeBhk);
        assert_eq!(PropertyType::parse_lenient("studio"), PropertyType::TwoBhk);

        let parsed: PropertyType = serde_json::from_str("\"penthouse\"").expect("lenient parse");
        assert_eq!(parsed, PropertyType::TwoBhk);
        assert_eq!(
            serde_json::to_string(&PropertyType::OneBhk).expect("serialize"),
            "\"1BHK\""
        );
    }

    #[test]
    fn aqi_bands_follow_epa_breakpoints() {
        assert_eq!(AqiCategory::from_reading(50.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_reading(50.5), AqiCategory::Moderate);
        assert_eq!(
            AqiCategory::from_reading(150.0),
            AqiCategory::UnhealthyForSensitiveGroups
        );
        assert_eq!(AqiCategory::from_reading(301.0), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::VeryUnhealthy.label(), "Very Unhealthy");
    }

    #[test]
    fn delivery_count_and_city_key() {
        let flags = DeliveryFlags {
            blinkit: true,
            zomato: false,
            swiggy: true,
        };
        assert_eq!(flags.available_count(), 2);
        assert_eq!(DeliveryFlags::ALL.available_count(), 3);
        assert_eq!(city_key("  New   Delhi "), "new delhi");
    }

    #[test]
    fn bare_record_deserializes_with_defaults() {
        let record: MetricRecord = serde_json::from_str(
            r#"{"locality_id": 7, "locality_name": "Kolar Road", "city": "Bhopal"}"#,
        )
        .expect("minimal record");
        assert_eq!(record, MetricRecord::bare(7, "Kolar Road", "Bhopal"));
    }

    #[test]
    fn rank_request_defaults_optional_fields() {
        let request: RankRequest = serde_json::from_str(
            r#"{"city": "Bhopal", "number_of_people": 0, "budget": -5.0, "max_travel_distance_km": 80}"#,
        )
        .expect("request parses");
        assert_eq!(request.property_type, PropertyType::TwoBhk);
        assert!(request.weights.is_none());
        assert!(request.top_n.is_none());
        assert_eq!(request.household_size(), 1);
        assert_eq!(request.effective_budget(), 0.0);
        assert_eq!(request.effective_travel_distance_km(), 50.0);
    }

    #[test]
    fn rank_request_saturates_out_of_range_counts() {
        let request: RankRequest = serde_json::from_str(
            r#"{"city": "Bhopal", "number_of_people": -1, "budget": 20000, "top_n": -5}"#,
        )
        .expect("negative counts are defaulted, not rejected");
        assert_eq!(request.number_of_people, 0);
        assert_eq!(request.household_size(), 1);
        assert_eq!(request.top_n, Some(0));

        let request: RankRequest =
            serde_json::from_str(r#"{"city": "Bhopal", "budget": 20000, "top_n": 2.7}"#)
                .expect("missing household size is defaulted");
        assert_eq!(request.household_size(), 1);
        assert_eq!(request.top_n, Some(2));

        let request: RankRequest = serde_json::from_str(
            r#"{"city": "Bhopal", "number_of_people": 1e12, "budget": 20000, "top_n": null}"#,
        )
        .expect("oversized household saturates");
        assert_eq!(request.number_of_people, u32::MAX);
        assert_eq!(request.household_size(), MAX_HOUSEHOLD_SIZE);
        assert!(request.top_n.is_none());
    }
}
