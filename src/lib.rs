//! churnlens: descriptive statistics, heuristic projections and chart descriptors
//! for customer churn datasets
//!
//! Every operation takes a read-only [`Dataset`] and returns a fresh result;
//! columns are resolved by header name and validated before any computation.

pub mod aggregate;
pub mod charts;
pub mod cli;
pub mod command;
pub mod data;
pub mod error;
pub mod profile;
pub mod projection;
pub mod report;
pub mod stats;
pub mod viz;

// Re-export public items for easier access
pub use aggregate::{aggregate, StatisticsResult};
pub use charts::{build_charts, ChartDescriptor, ChartKind, Series, SeriesData};
pub use cli::Args;
pub use command::{execute, execute_with_rng, Command, Outcome};
pub use data::{load_dataset, Dataset, Field};
pub use error::InsightError;
pub use profile::{profile, profile_with_rng, DatasetProfile};
pub use projection::{project, ProjectionResult};
pub use stats::{is_undefined, UNDEFINED};

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, InsightError>;
