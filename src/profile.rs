//! Structural profile of a dataset: sample, size, column types, missing values and per-column summaries

use crate::data::Dataset;
use crate::stats::UNDEFINED;
use indexmap::IndexMap;
use polars::prelude::*;
use rand::Rng;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::{debug, info};

/// Number of rows drawn for the sample view
pub const SAMPLE_SIZE: usize = 10;

const FREQUENCY: &str = "__frequency";

/// Coarse type tag inferred from a column's storage type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
    Other(String),
}

impl ColumnType {
    fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => ColumnType::Integer,
            DataType::Float32 | DataType::Float64 => ColumnType::Float,
            DataType::Boolean => ColumnType::Boolean,
            DataType::String => ColumnType::Text,
            other => ColumnType::Other(other.to_string()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => f.write_str("int64"),
            ColumnType::Float => f.write_str("float64"),
            ColumnType::Boolean => f.write_str("bool"),
            ColumnType::Text => f.write_str("object"),
            ColumnType::Other(name) => f.write_str(name),
        }
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Summary of a numeric column; nulls excluded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub median: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

/// Summary of a categorical column; nulls excluded
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    /// Most frequent label; ties go to the label seen first
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Structural profile of a dataset
#[derive(Debug, Clone, Serialize)]
pub struct DatasetProfile {
    #[serde(serialize_with = "serialize_rows")]
    pub sample: DataFrame,
    pub row_count: usize,
    pub column_types: IndexMap<String, ColumnType>,
    pub non_null_counts: IndexMap<String, usize>,
    pub missing_counts: IndexMap<String, usize>,
    pub descriptive_stats: IndexMap<String, ColumnSummary>,
}

/// Profile `dataset` using the thread-local RNG for sampling.
pub fn profile(dataset: &Dataset) -> crate::Result<DatasetProfile> {
    profile_with_rng(dataset, &mut rand::thread_rng())
}

/// Profile `dataset`, drawing the sample from `rng`.
///
/// Works on any frame, required columns or not; an empty dataset yields
/// zero counts and undefined statistics.
pub fn profile_with_rng<R: Rng + ?Sized>(
    dataset: &Dataset,
    rng: &mut R,
) -> crate::Result<DatasetProfile> {
    let frame = dataset.frame();
    debug!(rows = frame.height(), columns = frame.width(), "profiling dataset");

    let sample = dataset.sample_rows(SAMPLE_SIZE, rng)?;

    let mut column_types = IndexMap::new();
    let mut non_null_counts = IndexMap::new();
    let mut missing_counts = IndexMap::new();
    let mut descriptive_stats = IndexMap::new();

    for column in frame.get_columns() {
        let name = column.name().to_string();
        let column_type = ColumnType::of(column.dtype());
        let missing = column.null_count();

        let summary = if column_type.is_numeric() {
            ColumnSummary::Numeric(summarize_numeric(column)?)
        } else {
            ColumnSummary::Categorical(summarize_categorical(column)?)
        };

        non_null_counts.insert(name.clone(), column.len() - missing);
        missing_counts.insert(name.clone(), missing);
        column_types.insert(name.clone(), column_type);
        descriptive_stats.insert(name, summary);
    }

    info!(
        rows = frame.height(),
        sampled = sample.height(),
        "dataset profile complete"
    );

    Ok(DatasetProfile {
        sample,
        row_count: frame.height(),
        column_types,
        non_null_counts,
        missing_counts,
        descriptive_stats,
    })
}

fn summarize_numeric(column: &Column) -> crate::Result<NumericSummary> {
    let values = column.cast(&DataType::Float64)?;
    let values = values.f64()?;
    let quantile = |q: f64| -> crate::Result<f64> {
        Ok(values
            .quantile(q, QuantileMethod::Linear)?
            .unwrap_or(UNDEFINED))
    };

    Ok(NumericSummary {
        count: values.len() - values.null_count(),
        mean: values.mean().unwrap_or(UNDEFINED),
        std: values.std(1).unwrap_or(UNDEFINED),
        min: values.min().unwrap_or(UNDEFINED),
        q25: quantile(0.25)?,
        median: quantile(0.5)?,
        q75: quantile(0.75)?,
        max: values.max().unwrap_or(UNDEFINED),
    })
}

/// Label frequencies in first-seen order; the most frequent label wins,
/// ties going to the label seen first.
fn summarize_categorical(column: &Column) -> crate::Result<CategoricalSummary> {
    let name = column.name().clone();
    let labels = DataFrame::new(vec![column.cast(&DataType::String)?])?;
    let counts = labels
        .lazy()
        .filter(col(name.clone()).is_not_null())
        .group_by_stable([col(name.clone())])
        .agg([len().cast(DataType::UInt64).alias(FREQUENCY)])
        .sort(
            [FREQUENCY],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;
    let frequencies = counts.column(FREQUENCY)?.u64()?;

    Ok(CategoricalSummary {
        count: frequencies.sum().unwrap_or(0) as usize,
        unique: counts.height(),
        top: counts.column(name.as_str())?.str()?.get(0).map(str::to_owned),
        freq: frequencies.get(0).unwrap_or(0) as usize,
    })
}

/// Serialize a frame as a sequence of `{column: value}` records.
fn serialize_rows<S: Serializer>(
    frame: &DataFrame,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(frame.height()))?;
    for row in 0..frame.height() {
        let mut record: IndexMap<&str, String> = IndexMap::new();
        for column in frame.get_columns() {
            let value = column
                .get(row)
                .map_err(<S::Error as serde::ser::Error>::custom)?;
            let value = match value {
                AnyValue::Null => String::new(),
                AnyValue::String(s) => s.to_string(),
                other => other.to_string(),
            };
            record.insert(column.name().as_str(), value);
        }
        seq.serialize_element(&record)?;
    }
    seq.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mixed_dataset() -> Dataset {
        let frame = df!(
            "Age" => [Some(30i64), Some(40), None, Some(50)],
            "Payment Delay" => [1.0f64, 2.0, 3.0, 4.0],
            "Gender" => [Some("Male"), Some("Female"), Some("Male"), None]
        )
        .unwrap();
        Dataset::new(frame)
    }

    #[test]
    fn test_profile_structure() {
        let dataset = mixed_dataset();
        let mut rng = StdRng::seed_from_u64(1);
        let profile = profile_with_rng(&dataset, &mut rng).unwrap();

        assert_eq!(profile.row_count, 4);
        assert_eq!(profile.sample.height(), 4);
        assert_eq!(profile.column_types["Age"], ColumnType::Integer);
        assert_eq!(profile.column_types["Gender"].to_string(), "object");
        assert_eq!(profile.missing_counts["Age"], 1);
        assert_eq!(profile.missing_counts["Gender"], 1);
        assert_eq!(profile.missing_counts["Payment Delay"], 0);
        assert_eq!(profile.non_null_counts["Age"], 3);
        assert_eq!(
            profile.column_types.keys().collect::<Vec<_>>(),
            vec!["Age", "Payment Delay", "Gender"]
        );
    }

    #[test]
    fn test_numeric_summary_excludes_nulls() {
        let profile = profile(&mixed_dataset()).unwrap();
        let ColumnSummary::Numeric(age) = &profile.descriptive_stats["Age"] else {
            panic!("Age should be summarized as numeric");
        };

        assert_eq!(age.count, 3);
        assert_eq!(age.mean, 40.0);
        assert!((age.std - 10.0).abs() < 1e-9);
        assert_eq!(age.min, 30.0);
        assert_eq!(age.q25, 35.0);
        assert_eq!(age.median, 40.0);
        assert_eq!(age.max, 50.0);
    }

    #[test]
    fn test_categorical_summary() {
        let profile = profile(&mixed_dataset()).unwrap();
        let ColumnSummary::Categorical(gender) = &profile.descriptive_stats["Gender"] else {
            panic!("Gender should be summarized as categorical");
        };

        assert_eq!(gender.count, 3);
        assert_eq!(gender.unique, 2);
        assert_eq!(gender.top.as_deref(), Some("Male"));
        assert_eq!(gender.freq, 2);
    }

    #[test]
    fn test_empty_dataset_is_degenerate_not_error() {
        let frame = df!(
            "Age" => Vec::<i64>::new(),
            "Gender" => Vec::<String>::new()
        )
        .unwrap();
        let profile = profile(&Dataset::new(frame)).unwrap();

        assert_eq!(profile.row_count, 0);
        assert_eq!(profile.sample.height(), 0);
        let ColumnSummary::Numeric(age) = &profile.descriptive_stats["Age"] else {
            panic!("Age should be summarized as numeric");
        };
        assert_eq!(age.count, 0);
        assert!(crate::stats::is_undefined(age.mean));
        assert!(crate::stats::is_undefined(age.max));
        let ColumnSummary::Categorical(gender) = &profile.descriptive_stats["Gender"] else {
            panic!("Gender should be summarized as categorical");
        };
        assert_eq!(gender.top, None);
        assert_eq!(gender.freq, 0);
    }

    #[test]
    fn test_profile_serializes_sample_as_records() {
        let profile = profile(&mixed_dataset()).unwrap();
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["row_count"], 4);
        assert_eq!(json["sample"].as_array().unwrap().len(), 4);
        assert_eq!(json["column_types"]["Payment Delay"], "float64");
        assert_eq!(json["descriptive_stats"]["Age"]["kind"], "numeric");
        assert_eq!(json["descriptive_stats"]["Age"]["50%"], 40.0);
    }
}
