use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The seven factors a locality is scored on, in their fixed merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Rent,
    GroceryCost,
    DeliveryAvailability,
    Aqi,
    Hygiene,
    Amenities,
    Connectivity,
}

impl Factor {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Rent,
            Self::GroceryCost,
            Self::DeliveryAvailability,
            Self::Aqi,
            Self::Hygiene,
            Self::Amenities,
            Self::Connectivity,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::GroceryCost => "grocery_cost",
            Self::DeliveryAvailability => "delivery_availability",
            Self::Aqi => "aqi",
            Self::Hygiene => "hygiene",
            Self::Amenities => "amenities",
            Self::Connectivity => "connectivity",
        }
    }

    pub const fn default_weight(self) -> f64 {
        match self {
            Self::Rent => 0.25,
            Self::GroceryCost => 0.15,
            Self::DeliveryAvailability => 0.10,
            Self::Aqi => 0.15,
            Self::Hygiene => 0.10,
            Self::Amenities => 0.15,
            Self::Connectivity => 0.10,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Complete, non-negative weight vector over every [`Factor`], summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorWeights {
    values: [f64; 7],
}

impl FactorWeights {
    pub fn get(&self, factor: Factor) -> f64 {
        self.values[factor.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        Factor::ordered()
            .into_iter()
            .map(move |factor| (factor, self.get(factor)))
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

impl Default for FactorWeights {
    fn default() -> Self {
        let merged = Factor::ordered().map(Factor::default_weight);
        Self {
            values: normalize(merged).unwrap_or(merged),
        }
    }
}

/// Raised when the caller's weights leave nothing to rank by.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error(
        "invalid weight configuration: merged weights sum to {sum}, supply at least one positive weight or omit the weights map"
    )]
    NonPositiveWeightSum { sum: f64 },
}

/// Merge caller weights over the defaults and renormalize to a unit sum.
///
/// Unknown keys are ignored. Negative or non-finite values count as zero.
pub fn resolve_weights(
    overrides: Option<&BTreeMap<String, f64>>,
) -> Result<FactorWeights, ConfigurationError> {
    let Some(overrides) = overrides else {
        return Ok(FactorWeights::default());
    };

    let merged = Factor::ordered().map(|factor| {
        overrides
            .get(factor.key())
            .copied()
            .map(sanitize_weight)
            .unwrap_or_else(|| factor.default_weight())
    });

    normalize(merged)
        .map(|values| FactorWeights { values })
        .ok_or(ConfigurationError::NonPositiveWeightSum { sum: 0.0 })
}

/// Divide by the largest weight before summing so huge finite weights
/// cannot overflow the total. `None` when every weight is zero.
fn normalize(merged: [f64; 7]) -> Option<[f64; 7]> {
    let largest = merged.iter().copied().fold(0.0_f64, f64::max);
    if largest <= 0.0 {
        return None;
    }

    let scaled = merged.map(|weight| weight / largest);
    let sum: f64 = scaled.iter().sum();
    Some(scaled.map(|weight| weight / sum))
}

fn sanitize_weight(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
