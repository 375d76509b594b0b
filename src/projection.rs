//! Forward-looking projections built from fixed multipliers
//!
//! None of these are fitted: each projection scales a current average or
//! count by a constant growth assumption.

use crate::data::{Dataset, Field};
use crate::stats::{self, UNDEFINED};
use polars::prelude::{col, lit, DataType, Expr, IntoLazy};
use serde::Serialize;
use tracing::{debug, info};

/// Months in the projection horizon
pub const MONTHS_PER_YEAR: f64 = 12.0;
/// Assumed growth in support calls
pub const SUPPORT_CALLS_GROWTH: f64 = 1.10;
/// Assumed growth in payment delay
pub const PAYMENT_DELAY_GROWTH: f64 = 1.05;
/// Share of Basic and Standard subscribers expected to upgrade
pub const UPGRADE_RATE: f64 = 0.15;
/// Assumed tenure improvement from retention work
pub const TENURE_GROWTH: f64 = 1.20;

/// Subscription tiers that can still upgrade
pub const UPGRADABLE_TIERS: [&str; 2] = ["Standard", "Basic"];

/// Columns read by [`project`]
pub const REQUIRED_FIELDS: [Field; 6] = [
    Field::TotalSpend,
    Field::Churn,
    Field::SupportCalls,
    Field::PaymentDelay,
    Field::SubscriptionType,
    Field::Tenure,
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionResult {
    #[serde(rename = "Projected Total Spend Next Year")]
    pub total_spend_next_year: f64,
    #[serde(rename = "Projected Churn Next Year")]
    pub churn_next_year: f64,
    #[serde(rename = "Projected Support Calls Increase")]
    pub support_calls_increase: f64,
    #[serde(rename = "Projected Payment Delay Increase")]
    pub payment_delay_increase: f64,
    #[serde(rename = "Projected Subscription Upgrades")]
    pub subscription_upgrades: f64,
    #[serde(rename = "Projected Tenure Growth")]
    pub tenure_growth: f64,
}

impl ProjectionResult {
    pub fn undefined() -> Self {
        Self {
            total_spend_next_year: UNDEFINED,
            churn_next_year: UNDEFINED,
            support_calls_increase: UNDEFINED,
            payment_delay_increase: UNDEFINED,
            subscription_upgrades: UNDEFINED,
            tenure_growth: UNDEFINED,
        }
    }

    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("Projected Total Spend Next Year", self.total_spend_next_year),
            ("Projected Churn Next Year", self.churn_next_year),
            ("Projected Support Calls Increase", self.support_calls_increase),
            ("Projected Payment Delay Increase", self.payment_delay_increase),
            ("Projected Subscription Upgrades", self.subscription_upgrades),
            ("Projected Tenure Growth", self.tenure_growth),
        ]
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

/// Project next year's figures for `dataset`.
///
/// # Returns
/// * `ProjectionResult`, fully undefined when the dataset has no rows
pub fn project(dataset: &Dataset) -> crate::Result<ProjectionResult> {
    let frame = dataset.typed_columns(&REQUIRED_FIELDS)?;
    debug!(rows = dataset.row_count(), "projecting customer figures");

    if dataset.is_empty() {
        info!("dataset is empty, projections are undefined");
        return Ok(ProjectionResult::undefined());
    }

    let rows = lit(dataset.row_count() as f64);
    let summary = frame
        .lazy()
        .select([
            col(Field::TotalSpend.name()).mean() * lit(MONTHS_PER_YEAR) * rows.clone(),
            col(Field::Churn.name()).mean() * rows,
            col(Field::SupportCalls.name()).mean() * lit(SUPPORT_CALLS_GROWTH),
            col(Field::PaymentDelay.name()).mean() * lit(PAYMENT_DELAY_GROWTH),
            upgradable_tier()
                .cast(DataType::Float64)
                .sum()
                .alias(Field::SubscriptionType.name()),
            col(Field::Tenure.name()).mean() * lit(TENURE_GROWTH),
        ])
        .collect()?;
    let value = |field: Field| stats::scalar(&summary, field.name());

    let upgradable = value(Field::SubscriptionType)?;
    let result = ProjectionResult {
        total_spend_next_year: value(Field::TotalSpend)?,
        churn_next_year: value(Field::Churn)?,
        support_calls_increase: value(Field::SupportCalls)?,
        payment_delay_increase: value(Field::PaymentDelay)?,
        subscription_upgrades: upgradable * UPGRADE_RATE,
        tenure_growth: value(Field::Tenure)?,
    };

    info!(
        rows = dataset.row_count(),
        upgradable,
        "customer projections computed"
    );
    Ok(result)
}

/// True for rows on a tier that can still upgrade
fn upgradable_tier() -> Expr {
    UPGRADABLE_TIERS.iter().fold(lit(false), |any, tier| {
        any.or(col(Field::SubscriptionType.name()).eq(lit(*tier)))
    })
}
