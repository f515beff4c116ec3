use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::city_key;

/// Grocery cost used for cities missing from the default table.
pub const FALLBACK_GROCERY_COST: f64 = 4500.0;

/// Tunables and fallback values the ranking engine applies to missing data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Monthly grocery cost assumed for a locality with no scraped data, by city.
    pub city_grocery_defaults: BTreeMap<String, f64>,
    pub fallback_grocery_cost: f64,
    /// AQI assumed when a locality has no reading ("Moderate" boundary).
    pub default_aqi: f64,
    /// Readings at or below this count as acceptable when the pool has no spread.
    pub acceptable_aqi: f64,
    /// AQI score given to an unacceptable reading when the pool has no spread.
    pub degenerate_aqi_penalty: f64,
    /// Flat multiplier applied to every over-budget composite score.
    pub budget_penalty_multiplier: f64,
    pub default_top_n: usize,
    pub max_top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        let city_grocery_defaults = [
            ("Bhopal", 4500.0),
            ("Indore", 5000.0),
            ("Gwalior", 4200.0),
            ("Jabalpur", 4300.0),
            ("Ujjain", 4000.0),
            ("Sagar", 3800.0),
            ("Ratlam", 3900.0),
        ]
        .into_iter()
        .map(|(city, cost)| (city.to_string(), cost))
        .collect();

        Self {
            city_grocery_defaults,
            fallback_grocery_cost: FALLBACK_GROCERY_COST,
            default_aqi: 50.0,
            acceptable_aqi: 50.0,
            degenerate_aqi_penalty: 0.5,
            budget_penalty_multiplier: 0.5,
            default_top_n: 10,
            max_top_n: 50,
        }
    }
}

impl RankingConfig {
    pub fn grocery_default_for(&self, city: &str) -> f64 {
        let wanted = city_key(city);
        self.city_grocery_defaults
            .iter()
            .find(|(name, _)| city_key(name) == wanted)
            .map(|(_, cost)| *cost)
            .unwrap_or(self.fallback_grocery_cost)
    }

    /// Clamp a requested result count into `1..=max_top_n`.
    pub fn effective_top_n(&self, requested: Option<usize>) -> usize {
        let max = self.max_top_n.max(1);
        requested.unwrap_or(self.default_top_n).clamp(1, max)
    }
}
