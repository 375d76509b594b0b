//! Command surface: one enum variant per dashboard action, each mapped to a direct call

use crate::aggregate::{aggregate, StatisticsResult};
use crate::charts::{build_charts, ChartDescriptor};
use crate::data::Dataset;
use crate::profile::{profile_with_rng, DatasetProfile};
use crate::projection::{project, ProjectionResult};
use clap::ValueEnum;
use rand::Rng;
use serde::Serialize;
use tracing::info_span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Sample, size, column types, missing values and per-column summaries
    Profile,
    /// The six descriptive customer statistics
    Statistics,
    /// Next year's heuristic projections
    Projections,
    /// Chart descriptors for the dashboard plots
    Charts,
}

/// Result of one command, ready for a report writer or renderer
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", content = "result", rename_all = "lowercase")]
pub enum Outcome {
    Profile(DatasetProfile),
    Statistics(StatisticsResult),
    Projections(ProjectionResult),
    Charts(Vec<ChartDescriptor>),
}

/// Run `command` against `dataset`, sampling with the thread-local RNG.
pub fn execute(command: Command, dataset: &Dataset) -> crate::Result<Outcome> {
    execute_with_rng(command, dataset, &mut rand::thread_rng())
}

pub fn execute_with_rng<R: Rng + ?Sized>(
    command: Command,
    dataset: &Dataset,
    rng: &mut R,
) -> crate::Result<Outcome> {
    let _span = info_span!("execute", ?command).entered();

    Ok(match command {
        Command::Profile => Outcome::Profile(profile_with_rng(dataset, rng)?),
        Command::Statistics => Outcome::Statistics(aggregate(dataset)?),
        Command::Projections => Outcome::Projections(project(dataset)?),
        Command::Charts => Outcome::Charts(build_charts(dataset)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    fn customers() -> Dataset {
        let frame = df!(
            "Age" => [30i64, 40],
            "Tenure" => [12i64, 24],
            "Support Calls" => [0i64, 2],
            "Payment Delay" => [5.0f64, 15.0],
            "Subscription Type" => ["Premium", "Basic"],
            "Total Spend" => [250.0f64, 750.0],
            "Gender" => ["Female", "Male"],
            "Contract Length" => ["Annual", "Monthly"],
            "Churn" => [0i64, 1]
        )
        .unwrap();
        Dataset::new(frame)
    }

    #[test]
    fn test_each_command_maps_to_its_outcome() {
        let dataset = customers();

        assert!(matches!(
            execute(Command::Profile, &dataset).unwrap(),
            Outcome::Profile(p) if p.row_count == 2
        ));
        assert!(matches!(
            execute(Command::Statistics, &dataset).unwrap(),
            Outcome::Statistics(s) if s.total_spend == 1000.0
        ));
        assert!(matches!(
            execute(Command::Projections, &dataset).unwrap(),
            Outcome::Projections(p) if p.total_spend_next_year == 12000.0
        ));
        assert!(matches!(
            execute(Command::Charts, &dataset).unwrap(),
            Outcome::Charts(c) if c.len() == 6
        ));
    }

    #[test]
    fn test_outcome_json_is_tagged() {
        let outcome = execute(Command::Statistics, &customers()).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["command"], "statistics");
        assert_eq!(json["result"]["Average Age"], 35.0);
    }

    #[test]
    fn test_command_parses_from_cli_name() {
        assert_eq!(Command::from_str("projections", true), Ok(Command::Projections));
        assert!(Command::from_str("forecast", true).is_err());
    }
}
