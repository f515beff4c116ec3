//! Min-max normalization of raw metric columns onto `[0, 1]`.
//!
//! Every column is scaled relative to the current candidate pool, so the same
//! raw value can normalize differently in another city or a filtered subset.

use serde::{Deserialize, Serialize};

use super::config::RankingConfig;
use super::weights::Factor;

/// Raw values for one candidate after missing fields were defaulted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateMetrics {
    pub rent: f64,
    pub grocery_cost: f64,
    pub aqi: f64,
    /// `0.0` marks "no rated restaurants".
    pub restaurant_rating: f64,
    pub amenities_score: f64,
    pub connectivity_score: f64,
    pub deliveries_available: u8,
}

/// Normalized value of every factor for a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FactorScores {
    pub rent: f64,
    pub grocery_cost: f64,
    pub delivery_availability: f64,
    pub aqi: f64,
    pub hygiene: f64,
    pub amenities: f64,
    pub connectivity: f64,
}

impl FactorScores {
    pub fn get(&self, factor: Factor) -> f64 {
        match factor {
            Factor::Rent => self.rent,
            Factor::GroceryCost => self.grocery_cost,
            Factor::DeliveryAvailability => self.delivery_availability,
            Factor::Aqi => self.aqi,
            Factor::Hygiene => self.hygiene,
            Factor::Amenities => self.amenities,
            Factor::Connectivity => self.connectivity,
        }
    }
}

/// What a lower-is-better column scores when every candidate shares one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegenerateRange {
    /// `1.0` at or below `limit`, `outside` above it.
    WithinLimit { limit: f64, outside: f64 },
    Constant(f64),
}

impl DegenerateRange {
    fn score(self, value: f64) -> f64 {
        match self {
            Self::WithinLimit { limit, outside } => {
                if value <= limit {
                    1.0
                } else {
                    outside
                }
            }
            Self::Constant(score) => score,
        }
    }
}

/// Normalize every candidate in the pool, column by column.
pub fn normalize_pool(
    pool: &[CandidateMetrics],
    budget: f64,
    config: &RankingConfig,
) -> Vec<FactorScores> {
    let rent = lower_is_better(
        &column(pool, |c| c.rent),
        DegenerateRange::WithinLimit {
            limit: budget,
            outside: 0.0,
        },
    );
    let grocery = lower_is_better(
        &column(pool, |c| c.grocery_cost),
        DegenerateRange::Constant(1.0),
    );
    let aqi = lower_is_better(
        &column(pool, |c| c.aqi),
        DegenerateRange::WithinLimit {
            limit: config.acceptable_aqi,
            outside: config.degenerate_aqi_penalty,
        },
    );
    let hygiene = rated_subset(&column(pool, |c| c.restaurant_rating));

    pool.iter()
        .enumerate()
        .map(|(index, candidate)| FactorScores {
            rent: rent[index],
            grocery_cost: grocery[index],
            delivery_availability: delivery_share(candidate.deliveries_available),
            aqi: aqi[index],
            hygiene: hygiene[index],
            amenities: out_of_ten(candidate.amenities_score),
            connectivity: out_of_ten(candidate.connectivity_score),
        })
        .collect()
}

/// Invert-scale a column where smaller raw values are preferable.
pub fn lower_is_better(values: &[f64], degenerate: DegenerateRange) -> Vec<f64> {
    let Some((min, max)) = bounds(values.iter().copied()) else {
        return Vec::new();
    };

    if max > min {
        let span = max - min;
        values
            .iter()
            .map(|value| 1.0 - (value - min) / span)
            .collect()
    } else {
        values.iter().map(|value| degenerate.score(*value)).collect()
    }
}

/// Scale a column where `0.0` means "no data", using only the positive entries
/// for the bounds. Unrated candidates always score `0.0`.
pub fn rated_subset(values: &[f64]) -> Vec<f64> {
    let Some((min, max)) = bounds(values.iter().copied().filter(|value| *value > 0.0)) else {
        return vec![0.0; values.len()];
    };

    values
        .iter()
        .map(|value| {
            if *value <= 0.0 {
                0.0
            } else if max > min {
                ((value - min) / (max - min)).clamp(0.0, 1.0)
            } else {
                1.0
            }
        })
        .collect()
}

/// Scores already on a 0-10 scale. Zero stays zero.
pub fn out_of_ten(value: f64) -> f64 {
    (value / 10.0).clamp(0.0, 1.0)
}

pub fn delivery_share(available: u8) -> f64 {
    f64::from(available.min(3)) / 3.0
}

fn column(pool: &[CandidateMetrics], pick: impl Fn(&CandidateMetrics) -> f64) -> Vec<f64> {
    pool.iter().map(pick).collect()
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(rent: f64, aqi: f64, rating: f64) -> CandidateMetrics {
        CandidateMetrics {
            rent,
            grocery_cost: 4500.0,
            aqi,
            restaurant_rating: rating,
            amenities_score: 5.0,
            connectivity_score: 0.0,
            deliveries_available: 0,
        }
    }

    #[test]
    fn lower_is_better_inverts_the_range() {
        let scores = lower_is_better(&[10.0, 15.0, 20.0], DegenerateRange::Constant(1.0));
        assert_eq!(scores, vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn degenerate_rent_compares_against_budget() {
        let within = lower_is_better(
            &[12000.0, 12000.0],
            DegenerateRange::WithinLimit {
                limit: 12000.0,
                outside: 0.0,
            },
        );
        assert_eq!(within, vec![1.0, 1.0]);

        let over = lower_is_better(
            &[12000.0],
            DegenerateRange::WithinLimit {
                limit: 11999.0,
                outside: 0.0,
            },
        );
        assert_eq!(over, vec![0.0]);
    }

    #[test]
    fn single_candidate_uses_sentinels_for_every_cost_column() {
        let config = RankingConfig::default();
        let scores = normalize_pool(&[candidate(9000.0, 80.0, 0.0)], 20000.0, &config);

        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].rent, 1.0);
        assert_eq!(scores[0].grocery_cost, 1.0);
        assert_eq!(scores[0].aqi, 0.5);
        assert_eq!(scores[0].hygiene, 0.0);
        assert_eq!(scores[0].amenities, 0.5);
        assert_eq!(scores[0].connectivity, 0.0);
    }

    #[test]
    fn clean_air_single_candidate_scores_full_aqi() {
        let config = RankingConfig::default();
        let scores = normalize_pool(&[candidate(9000.0, 50.0, 0.0)], 100.0, &config);
        assert_eq!(scores[0].aqi, 1.0);
        assert_eq!(scores[0].rent, 0.0);
    }

    #[test]
    fn rating_bounds_ignore_unrated_candidates() {
        let scores = rated_subset(&[0.0, 3.0, 4.0, 5.0]);
        assert_eq!(scores, vec![0.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn rating_with_single_rated_value() {
        assert_eq!(rated_subset(&[4.2, 0.0]), vec![1.0, 0.0]);
        assert_eq!(rated_subset(&[4.2, 4.2]), vec![1.0, 1.0]);
    }

    #[test]
    fn rating_without_any_data_is_zero() {
        assert_eq!(rated_subset(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn scaled_and_delivery_columns() {
        assert_eq!(out_of_ten(0.0), 0.0);
        assert_eq!(out_of_ten(7.5), 0.75);
        assert_eq!(out_of_ten(12.0), 1.0);
        assert_eq!(delivery_share(0), 0.0);
        assert_eq!(delivery_share(3), 1.0);
        assert!((delivery_share(2) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_pool_normalizes_to_nothing() {
        let config = RankingConfig::default();
        assert!(normalize_pool(&[], 1000.0, &config).is_empty());
        assert!(lower_is_better(&[], DegenerateRange::Constant(1.0)).is_empty());
    }
}
