//! The six descriptive customer statistics

use crate::data::{Dataset, Field};
use crate::stats::{self, UNDEFINED};
use polars::prelude::{col, lit, IntoLazy};
use serde::Serialize;
use tracing::{debug, info};

/// Columns read by [`aggregate`]
pub const REQUIRED_FIELDS: [Field; 6] = [
    Field::Age,
    Field::Tenure,
    Field::TotalSpend,
    Field::SupportCalls,
    Field::Churn,
    Field::PaymentDelay,
];

/// Named descriptive statistics of one dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatisticsResult {
    #[serde(rename = "Average Age")]
    pub average_age: f64,
    #[serde(rename = "Average Tenure")]
    pub average_tenure: f64,
    #[serde(rename = "Total Spend")]
    pub total_spend: f64,
    #[serde(rename = "Average Support Calls")]
    pub average_support_calls: f64,
    #[serde(rename = "Churn Rate (%)")]
    pub churn_rate_pct: f64,
    #[serde(rename = "Payment Delay Std Dev")]
    pub payment_delay_std_dev: f64,
}

impl StatisticsResult {
    /// Every statistic set to the undefined marker
    pub fn undefined() -> Self {
        Self {
            average_age: UNDEFINED,
            average_tenure: UNDEFINED,
            total_spend: UNDEFINED,
            average_support_calls: UNDEFINED,
            churn_rate_pct: UNDEFINED,
            payment_delay_std_dev: UNDEFINED,
        }
    }

    /// Statistics as `(name, value)` pairs in display order
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("Average Age", self.average_age),
            ("Average Tenure", self.average_tenure),
            ("Total Spend", self.total_spend),
            ("Average Support Calls", self.average_support_calls),
            ("Churn Rate (%)", self.churn_rate_pct),
            ("Payment Delay Std Dev", self.payment_delay_std_dev),
        ]
    }

    /// Look up a statistic by its display name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

/// Compute the descriptive statistics of `dataset`.
///
/// Nulls are ignored per column. The standard deviation uses the sample
/// (N - 1) convention. A dataset without rows yields
/// [`StatisticsResult::undefined`].
pub fn aggregate(dataset: &Dataset) -> crate::Result<StatisticsResult> {
    let frame = dataset.typed_columns(&REQUIRED_FIELDS)?;
    debug!(rows = dataset.row_count(), "aggregating customer statistics");

    if dataset.is_empty() {
        info!("dataset is empty, statistics are undefined");
        return Ok(StatisticsResult::undefined());
    }

    let summary = frame
        .lazy()
        .select([
            col(Field::Age.name()).mean(),
            col(Field::Tenure.name()).mean(),
            col(Field::TotalSpend.name()).sum(),
            col(Field::SupportCalls.name()).mean(),
            col(Field::Churn.name()).mean() * lit(100.0),
            col(Field::PaymentDelay.name()).std(1),
        ])
        .collect()?;
    let value = |field: Field| stats::scalar(&summary, field.name());

    let result = StatisticsResult {
        average_age: value(Field::Age)?,
        average_tenure: value(Field::Tenure)?,
        total_spend: value(Field::TotalSpend)?,
        average_support_calls: value(Field::SupportCalls)?,
        churn_rate_pct: value(Field::Churn)?,
        payment_delay_std_dev: value(Field::PaymentDelay)?,
    };

    info!(
        rows = dataset.row_count(),
        churn_rate_pct = result.churn_rate_pct,
        "customer statistics computed"
    );
    Ok(result)
}
