//! Error types shared by the statistics engine and its collaborators

use thiserror::Error;

/// Errors raised while validating a dataset or producing a view of it.
///
/// An empty dataset is never an error: operations report the undefined
/// marker ([`crate::UNDEFINED`]) for every affected field instead.
#[derive(Error, Debug)]
pub enum InsightError {
    /// A required column is absent from the dataset.
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    /// A value could not be coerced to the column's semantic type.
    #[error("column '{column}' has an invalid value at row {row}: {value}")]
    TypeMismatch {
        column: String,
        row: usize,
        value: String,
    },

    /// Failure inside the frame layer.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Chart rendering failed.
    #[error("failed to render chart '{title}': {message}")]
    Render { title: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InsightError {
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn type_mismatch(column: impl Into<String>, row: usize, value: impl Into<String>) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            row,
            value: value.into(),
        }
    }

    /// Name of the column the error refers to, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::MissingColumn { column } | Self::TypeMismatch { column, .. } => Some(column),
            _ => None,
        }
    }
}
