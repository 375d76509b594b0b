//! Command-line interface definitions and argument parsing

use crate::command::Command;
use crate::report::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Customer churn dashboard: profile a dataset, compute statistics and projections, build charts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Action to run against the dataset
    #[arg(value_enum)]
    pub command: Command,

    /// Path to the input CSV file
    #[arg(short, long, default_value = "customer_churn.csv")]
    pub input: PathBuf,

    /// Report format written to stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Directory to render chart PNGs into (charts command only)
    #[arg(long)]
    pub charts_dir: Option<PathBuf>,

    /// Seed for the profile sample; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Default log filter when `RUST_LOG` is unset
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "churnlens=debug"
        } else {
            "churnlens=warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "churnlens",
            "charts",
            "--input",
            "data.csv",
            "--charts-dir",
            "out",
            "--seed",
            "42",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.command, Command::Charts);
        assert_eq!(args.input, PathBuf::from("data.csv"));
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.charts_dir, Some(PathBuf::from("out")));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.log_filter(), "churnlens=debug");
    }

    #[test]
    fn test_defaults_and_invalid_command() {
        let args = Args::try_parse_from(["churnlens", "statistics", "-f", "json"]).unwrap();
        assert_eq!(args.input, PathBuf::from("customer_churn.csv"));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.log_filter(), "churnlens=warn");

        assert!(Args::try_parse_from(["churnlens", "forecast"]).is_err());
    }
}
