//! Neighborhood cost-of-living scoring: ranks a city's localities for a household.

pub mod config;
pub mod error;
pub mod recommendations;
pub mod snapshot;
pub mod telemetry;
