use crate::infra::{load_records, sample_records};
use clap::Args;
use costpulse::error::AppError;
use costpulse::recommendations::{
    MetricRecord, PropertyType, RankRequest, RankingConfig, RankingOutcome, RecommendationService,
    SnapshotMetricsStore,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// CSV metrics snapshot to rank from
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    #[command(flatten)]
    pub(crate) household: HouseholdArgs,
    /// Print the full JSON response instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    #[command(flatten)]
    pub(crate) household: HouseholdArgs,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct HouseholdArgs {
    /// City to rank
    #[arg(long, default_value = "Bhopal")]
    pub(crate) city: String,
    /// Number of people sharing the home
    #[arg(long, default_value_t = 2)]
    pub(crate) people: u32,
    /// Monthly budget covering rent and groceries
    #[arg(long, default_value_t = 25000.0)]
    pub(crate) budget: f64,
    /// Layout to price rent for (1BHK, 2BHK or 3BHK)
    #[arg(long, default_value = "2BHK")]
    pub(crate) property_type: String,
    /// Number of localities to show
    #[arg(long)]
    pub(crate) top_n: Option<usize>,
    /// Factor weight override, e.g. `--weight rent=0.4` (repeatable)
    #[arg(long = "weight", value_parser = parse_weight)]
    pub(crate) weights: Vec<(String, f64)>,
    /// Maximum travel distance in km (echoed only)
    #[arg(long, default_value_t = 10.0)]
    pub(crate) max_travel_km: f64,
}

impl HouseholdArgs {
    pub(crate) fn request(&self) -> RankRequest {
        let mut request = RankRequest::new(self.city.clone(), self.people, self.budget)
            .with_property_type(PropertyType::parse_lenient(&self.property_type))
            .with_max_travel_distance_km(self.max_travel_km);
        if let Some(top_n) = self.top_n {
            request = request.with_top_n(top_n);
        }
        if !self.weights.is_empty() {
            let weights: BTreeMap<String, f64> = self.weights.iter().cloned().collect();
            request = request.with_weights(weights);
        }
        request
    }
}

pub(crate) fn parse_weight(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FACTOR=WEIGHT, got '{raw}'"))?;
    let weight = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("failed to parse weight '{value}' ({err})"))?;
    Ok((key.trim().to_string(), weight))
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        snapshot,
        household,
        json,
    } = args;

    let records = load_records(&snapshot)?;
    let outcome = rank_records(records, &household.request())?;

    if json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(body) => println!("{}", body),
            Err(err) => println!("Ranking payload unavailable: {}", err),
        }
    } else {
        render_ranking(&outcome);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let request = args.household.request();

    println!("Neighborhood scoring demo");
    println!(
        "Household of {} in {} looking for a {} within {:.0}/month",
        request.household_size(),
        request.city,
        request.property_type.label(),
        request.effective_budget()
    );

    let outcome = rank_records(sample_records()?, &request)?;
    render_ranking(&outcome);

    if let Some(best) = outcome.recommendations.first() {
        println!("\nWhy {} ranks first:", best.locality_name);
        let scores = &best.normalized_scores;
        for (factor, score) in [
            ("rent", scores.rent),
            ("grocery_cost", scores.grocery_cost),
            ("delivery_availability", scores.delivery_availability),
            ("aqi", scores.aqi),
            ("hygiene", scores.hygiene),
            ("amenities", scores.amenities),
            ("connectivity", scores.connectivity),
        ] {
            println!("  - {:<22} {:.2}", factor, score);
        }
    }

    Ok(())
}

fn rank_records(
    records: Vec<MetricRecord>,
    request: &RankRequest,
) -> Result<RankingOutcome, AppError> {
    let store = Arc::new(SnapshotMetricsStore::from_records(records));
    let service = RecommendationService::new(store, RankingConfig::default());
    Ok(service.recommend(request)?)
}

pub(crate) fn render_ranking(outcome: &RankingOutcome) {
    let filters = &outcome.filters_applied;
    println!(
        "\n{} ({} of {} localities, {} people, budget {:.0})",
        filters.city,
        outcome.total_neighborhoods,
        outcome.candidates_considered,
        filters.number_of_people,
        filters.budget
    );

    if outcome.recommendations.is_empty() {
        println!("  No localities found for this city");
        return;
    }

    println!(
        "  {:>2}  {:<20} {:>6} {:>8} {:>9} {:>5}  {}",
        "#", "Locality", "Score", "Rent", "Monthly", "AQI", "Notes"
    );
    for (position, locality) in outcome.recommendations.iter().enumerate() {
        let mut notes = Vec::new();
        if locality.over_budget {
            notes.push("over budget".to_string());
        }
        if locality.grocery_cost.is_none() {
            notes.push("grocery estimated".to_string());
        }
        if let Some(category) = &locality.aqi_category {
            notes.push(category.clone());
        }

        println!(
            "  {:>2}  {:<20} {:>6.3} {:>8.0} {:>9.0} {:>5.0}  {}",
            position + 1,
            locality.locality_name,
            locality.score,
            locality.rent,
            locality.total_monthly_cost,
            locality.aqi,
            notes.join(", ")
        );
    }
}
