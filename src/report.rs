//! Plain-text and JSON rendering of command outcomes

use crate::charts::{ChartDescriptor, SeriesData};
use crate::command::Outcome;
use crate::profile::{ColumnSummary, DatasetProfile};
use clap::ValueEnum;
use std::fmt::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render `outcome` in the requested format.
pub fn render(outcome: &Outcome, format: OutputFormat) -> crate::Result<String> {
    match format {
        OutputFormat::Text => render_text(outcome),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
    }
}

/// Human-readable report; numeric results are rounded to two decimals.
pub fn render_text(outcome: &Outcome) -> crate::Result<String> {
    let mut out = String::new();
    match outcome {
        Outcome::Profile(profile) => write_profile(&mut out, profile)?,
        Outcome::Statistics(stats) => {
            write_named_values(&mut out, "Customer Statistics", &stats.entries())?
        }
        Outcome::Projections(projections) => {
            write_named_values(&mut out, "Future Insights", &projections.entries())?
        }
        Outcome::Charts(charts) => write_charts(&mut out, charts)?,
    }
    Ok(out)
}

fn write_named_values(
    out: &mut impl Write,
    heading: &str,
    entries: &[(&'static str, f64)],
) -> fmt::Result {
    writeln!(out, "=== {heading} ===")?;
    for (name, value) in entries {
        writeln!(out, "{name}: {value:.2}")?;
    }
    Ok(())
}

fn write_profile(out: &mut impl Write, profile: &DatasetProfile) -> fmt::Result {
    writeln!(out, "=== Dataset Sample ===\n{}\n", profile.sample)?;
    writeln!(out, "=== Dataset Size ===\n{}\n", profile.row_count)?;

    writeln!(out, "=== Dataset Info ===")?;
    writeln!(out, "  {:<24} | {:>8} | {:>8} | Type", "Column", "Non-Null", "Missing")?;
    for (name, column_type) in &profile.column_types {
        writeln!(
            out,
            "  {:<24} | {:>8} | {:>8} | {}",
            name,
            profile.non_null_counts.get(name).copied().unwrap_or(0),
            profile.missing_counts.get(name).copied().unwrap_or(0),
            column_type
        )?;
    }

    writeln!(out, "\n=== Statistics ===")?;
    for (name, summary) in &profile.descriptive_stats {
        match summary {
            ColumnSummary::Numeric(s) => writeln!(
                out,
                "  {name}: count={} mean={:.2} std={:.2} min={:.2} 25%={:.2} 50%={:.2} 75%={:.2} max={:.2}",
                s.count, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max
            )?,
            ColumnSummary::Categorical(s) => writeln!(
                out,
                "  {name}: count={} unique={} top={} freq={}",
                s.count,
                s.unique,
                s.top.as_deref().unwrap_or("-"),
                s.freq
            )?,
        }
    }
    Ok(())
}

fn write_charts(out: &mut impl Write, charts: &[ChartDescriptor]) -> fmt::Result {
    for chart in charts {
        writeln!(out, "=== {} ===", chart.title)?;
        for series in &chart.series {
            writeln!(out, "  [{}]", series.name)?;
            match &series.data {
                SeriesData::Bins(bins) => {
                    for bin in bins {
                        writeln!(out, "    {:>8.2} - {:<8.2} {}", bin.lower, bin.upper, bin.count)?;
                    }
                }
                SeriesData::Groups(groups) => {
                    for group in groups {
                        match group.percent {
                            Some(pct) => writeln!(
                                out,
                                "    {}: {:.2} ({:.1}%)",
                                group.key, group.value, pct
                            )?,
                            None => writeln!(out, "    {}: {:.2}", group.key, group.value)?,
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
