//! Customer dataset: CSV loading, required schema and typed column access using Polars

use crate::error::InsightError;
use polars::prelude::*;
use rand::Rng;
use std::fmt;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Semantic type a required column must coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole numbers (ages, months, call counts)
    Integer,
    /// Any real number (days, currency)
    Numeric,
    /// Free-form enumeration labels
    Category,
    /// Boolean encoded as 0/1
    Flag,
}

/// Required columns of a customer dataset, addressed by header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Age,
    Tenure,
    SupportCalls,
    PaymentDelay,
    SubscriptionType,
    TotalSpend,
    Gender,
    ContractLength,
    Churn,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Age,
        Field::Tenure,
        Field::SupportCalls,
        Field::PaymentDelay,
        Field::SubscriptionType,
        Field::TotalSpend,
        Field::Gender,
        Field::ContractLength,
        Field::Churn,
    ];

    /// Header name of the column in the source file
    pub fn name(self) -> &'static str {
        match self {
            Field::Age => "Age",
            Field::Tenure => "Tenure",
            Field::SupportCalls => "Support Calls",
            Field::PaymentDelay => "Payment Delay",
            Field::SubscriptionType => "Subscription Type",
            Field::TotalSpend => "Total Spend",
            Field::Gender => "Gender",
            Field::ContractLength => "Contract Length",
            Field::Churn => "Churn",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Age | Field::Tenure | Field::SupportCalls => FieldKind::Integer,
            Field::PaymentDelay | Field::TotalSpend => FieldKind::Numeric,
            Field::SubscriptionType | Field::Gender | Field::ContractLength => FieldKind::Category,
            Field::Churn => FieldKind::Flag,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only customer table handed to every operation.
///
/// Construction never validates: each operation checks the columns it
/// needs by name and fails with [`InsightError::MissingColumn`] or
/// [`InsightError::TypeMismatch`] before computing anything.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Fail fast if any of `fields` is absent.
    pub fn require(&self, fields: &[Field]) -> crate::Result<()> {
        for field in fields {
            self.column(*field)?;
        }
        Ok(())
    }

    fn column(&self, field: Field) -> crate::Result<&Column> {
        self.frame
            .column(field.name())
            .map_err(|_| InsightError::missing_column(field.name()))
    }

    /// Values of a numeric, integer or flag column as `f64`.
    ///
    /// Nulls, null tokens and float NaN all come back as null.
    pub fn numeric(&self, field: Field) -> crate::Result<Float64Chunked> {
        let column = self.column(field)?;
        let values: Vec<Option<f64>> = match column.dtype() {
            DataType::String => parse_numbers(field, column.str()?)?,
            DataType::Null => vec![None; column.len()],
            dtype if is_numeric_dtype(dtype) => column
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.filter(|v| !v.is_nan()))
                .collect(),
            _ => return Err(unsupported(field, column)),
        };

        check_domain(field, &values)?;
        Ok(Series::new(field.name().into(), values).f64()?.clone())
    }

    /// Non-null values of a numeric column.
    pub fn present_numbers(&self, field: Field) -> crate::Result<Vec<f64>> {
        Ok(self.numeric(field)?.into_iter().flatten().collect())
    }

    /// Labels of a category column.
    pub fn categorical(&self, field: Field) -> crate::Result<StringChunked> {
        let column = self.column(field)?;
        let text = match column.dtype() {
            DataType::String => column.clone(),
            dtype if matches!(dtype, DataType::Null) || is_numeric_dtype(dtype) => {
                column.cast(&DataType::String)?
            }
            _ => return Err(unsupported(field, column)),
        };
        Ok(text.str()?.clone())
    }

    /// Frame holding `fields` coerced to their semantic types.
    ///
    /// Numeric kinds become `Float64` and categories become `String`, so
    /// callers can build polars expressions without further casts. Every
    /// column is checked for presence before any value is validated.
    pub fn typed_columns(&self, fields: &[Field]) -> crate::Result<DataFrame> {
        self.require(fields)?;
        let columns = fields
            .iter()
            .map(|&field| {
                let series = match field.kind() {
                    FieldKind::Category => self.categorical(field)?.into_series(),
                    _ => self.numeric(field)?.into_series(),
                };
                Ok(Column::from(series))
            })
            .collect::<crate::Result<Vec<Column>>>()?;
        Ok(DataFrame::new(columns)?)
    }

    /// Uniformly random subset of up to `n` rows, in random order.
    pub fn sample_rows<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> crate::Result<DataFrame> {
        let amount = n.min(self.row_count());
        let indices: Vec<IdxSize> = rand::seq::index::sample(rng, self.row_count(), amount)
            .into_iter()
            .map(|i| i as IdxSize)
            .collect();
        let indices = IdxCa::from_vec("sample".into(), indices);
        Ok(self.frame.take(&indices)?)
    }
}

impl From<DataFrame> for Dataset {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}

/// Cell contents read as missing values, as spreadsheet and dataframe tools write them
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Load a delimited text file whose first row holds the column names.
///
/// # Arguments
/// * `file_path` - Path to the CSV file
///
/// # Returns
/// * `Dataset` wrapping the parsed frame; schema checks happen per operation
pub fn load_dataset<P: AsRef<Path>>(file_path: P) -> crate::Result<Dataset> {
    let path = file_path.as_ref();
    debug!(path = %path.display(), "reading customer dataset");

    let null_values = NULL_TOKENS.iter().map(|token| (*token).into()).collect();
    let options = CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default().with_null_values(Some(NullValues::AllColumns(null_values))),
        );

    let file = File::open(path)?;
    let frame = CsvReader::new(file).with_options(options).finish()?;

    info!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        "loaded customer dataset"
    );
    Ok(Dataset::new(frame))
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn parse_numbers(field: Field, text: &StringChunked) -> crate::Result<Vec<Option<f64>>> {
    text.into_iter()
        .enumerate()
        .map(|(row, value)| match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) if NULL_TOKENS.contains(&raw) => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(|v| Some(v).filter(|v| !v.is_nan()))
                .map_err(|_| InsightError::type_mismatch(field.name(), row, format!("{raw:?}"))),
        })
        .collect()
}

fn check_domain(field: Field, values: &[Option<f64>]) -> crate::Result<()> {
    let violates = |v: f64| match field.kind() {
        FieldKind::Integer => !v.is_finite() || v.fract() != 0.0 || v < 0.0,
        FieldKind::Numeric => !v.is_finite() || v < 0.0,
        FieldKind::Flag => v != 0.0 && v != 1.0,
        FieldKind::Category => false,
    };

    match values
        .iter()
        .enumerate()
        .find_map(|(row, v)| v.filter(|&v| violates(v)).map(|v| (row, v)))
    {
        Some((row, v)) => Err(InsightError::type_mismatch(field.name(), row, v.to_string())),
        None => Ok(()),
    }
}

fn unsupported(field: Field, column: &Column) -> InsightError {
    let value = column
        .get(0)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| column.dtype().to_string());
    InsightError::type_mismatch(field.name(), 0, value)
}
