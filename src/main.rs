//! churnlens: customer churn dashboard CLI
//!
//! Loads a CSV dataset, runs one command against it and writes the report
//! to stdout, optionally rendering chart PNGs.

use anyhow::{Context, Result};
use churnlens::{execute_with_rng, load_dataset, report, viz, Args, Command, Outcome};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let start_time = Instant::now();

    let dataset = load_dataset(&args.input)
        .with_context(|| format!("failed to load dataset from {}", args.input.display()))?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let outcome = execute_with_rng(args.command, &dataset, &mut rng)
        .with_context(|| format!("{:?} failed", args.command))?;

    println!("{}", report::render(&outcome, args.format)?);

    if let (Outcome::Charts(charts), Some(dir)) = (&outcome, &args.charts_dir) {
        let paths = viz::render_charts(charts, dir)?;
        for path in paths {
            info!(path = %path.display(), "chart written");
        }
    } else if args.charts_dir.is_some() && args.command != Command::Charts {
        warn!("--charts-dir is only used by the charts command");
    }

    info!(
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "command complete"
    );
    Ok(())
}
