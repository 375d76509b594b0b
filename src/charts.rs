//! Renderer-agnostic chart descriptors for distributions and group comparisons

use crate::data::{Dataset, Field};
use crate::stats::{self, HistogramBin, UNDEFINED};
use polars::prelude::{
    col, len, lit, DataFrame, DataType, Expr, IntoLazy, LazyFrame, SortMultipleOptions,
};
use serde::Serialize;
use tracing::debug;

/// Number of equal-width bins in every histogram
pub const HISTOGRAM_BINS: usize = 10;
/// Opacity of each layer in an overlaid histogram
pub const OVERLAY_OPACITY: f64 = 0.5;

/// Name of the aggregated column in a per-group frame
const VALUE: &str = "__value";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartKind {
    Histogram,
    Bar,
    /// Slices are labelled with their share of the total
    Pie,
    /// Several histograms drawn on the same axes
    OverlaidHistogram { opacity: f64 },
}

/// One bar or slice
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupValue {
    pub key: String,
    pub value: f64,
    /// Share of the series total in percent, set for pie slices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", content = "points", rename_all = "snake_case")]
pub enum SeriesData {
    Bins(Vec<HistogramBin>),
    Groups(Vec<GroupValue>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub data: SeriesData,
}

impl Series {
    /// Bars or slices of a grouped series; empty for histograms
    pub fn groups(&self) -> &[GroupValue] {
        match &self.data {
            SeriesData::Groups(groups) => groups,
            SeriesData::Bins(_) => &[],
        }
    }

    /// Buckets of a histogram series; empty for grouped series
    pub fn bins(&self) -> &[HistogramBin] {
        match &self.data {
            SeriesData::Bins(bins) => bins,
            SeriesData::Groups(_) => &[],
        }
    }
}

/// Description of a single chart; drawing it is left to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescriptor {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

impl ChartDescriptor {
    fn new(kind: ChartKind, title: &str, x_label: &str, y_label: &str, series: Vec<Series>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            series,
        }
    }
}

/// Build all six dashboard charts.
pub fn build_charts(dataset: &Dataset) -> crate::Result<Vec<ChartDescriptor>> {
    debug!(rows = dataset.row_count(), "building chart descriptors");
    Ok(vec![
        age_distribution(dataset)?,
        average_spend_by_subscription(dataset)?,
        gender_distribution(dataset)?,
        spend_by_contract_length(dataset)?,
        churn_rate_by_gender(dataset)?,
        age_distribution_by_gender(dataset)?,
    ])
}

pub fn age_distribution(dataset: &Dataset) -> crate::Result<ChartDescriptor> {
    let ages = dataset.present_numbers(Field::Age)?;
    Ok(ChartDescriptor::new(
        ChartKind::Histogram,
        "Distribution of Age",
        "Age",
        "Frequency",
        vec![Series {
            name: "Age".to_string(),
            data: SeriesData::Bins(stats::histogram(&ages, HISTOGRAM_BINS)),
        }],
    ))
}

pub fn average_spend_by_subscription(dataset: &Dataset) -> crate::Result<ChartDescriptor> {
    let key = Field::SubscriptionType;
    let value = Field::TotalSpend;
    let groups = per_group(dataset.typed_columns(&[key, value])?, key, col(value.name()).mean())
        .sort([key.name()], SortMultipleOptions::default())
        .collect()?;
    let bars = group_values(&groups, key)?
        .into_iter()
        .map(|(key, value)| bar(key, value))
        .collect();

    Ok(ChartDescriptor::new(
        ChartKind::Bar,
        "Average Total Spend by Subscription Type",
        "Subscription Type",
        "Average Total Spend",
        vec![grouped("Total Spend", bars)],
    ))
}

/// Gender value counts, largest first.
pub fn gender_distribution(dataset: &Dataset) -> crate::Result<ChartDescriptor> {
    let key = Field::Gender;
    let counts = per_group(dataset.typed_columns(&[key])?, key, len())
        .sort(
            [VALUE, key.name()],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;

    Ok(ChartDescriptor::new(
        ChartKind::Pie,
        "Gender Distribution",
        "",
        "",
        vec![grouped("Gender", slices(group_values(&counts, key)?))],
    ))
}

pub fn spend_by_contract_length(dataset: &Dataset) -> crate::Result<ChartDescriptor> {
    let key = Field::ContractLength;
    let value = Field::TotalSpend;
    let totals = per_group(dataset.typed_columns(&[key, value])?, key, col(value.name()).sum())
        .sort([key.name()], SortMultipleOptions::default())
        .collect()?;

    Ok(ChartDescriptor::new(
        ChartKind::Pie,
        "Total Spend Distribution by Contract Length",
        "",
        "",
        vec![grouped("Total Spend", slices(group_values(&totals, key)?))],
    ))
}

pub fn churn_rate_by_gender(dataset: &Dataset) -> crate::Result<ChartDescriptor> {
    let key = Field::Gender;
    let value = Field::Churn;
    let rates = per_group(
        dataset.typed_columns(&[key, value])?,
        key,
        col(value.name()).mean() * lit(100.0),
    )
    .sort([key.name()], SortMultipleOptions::default())
    .collect()?;
    let bars = group_values(&rates, key)?
        .into_iter()
        .map(|(key, value)| bar(key, value))
        .collect();

    Ok(ChartDescriptor::new(
        ChartKind::Bar,
        "Churn Rate by Gender",
        "Gender",
        "Churn Rate (%)",
        vec![grouped("Churn", bars)],
    ))
}

/// One Age histogram per Gender present, each binned over its own range.
pub fn age_distribution_by_gender(dataset: &Dataset) -> crate::Result<ChartDescriptor> {
    let key = Field::Gender;
    let value = Field::Age;
    let frame = dataset.typed_columns(&[key, value])?;
    let genders = per_group(frame.clone(), key, len())
        .sort([key.name()], SortMultipleOptions::default())
        .collect()?;

    let series = group_values(&genders, key)?
        .into_iter()
        .map(|(gender, _)| {
            let ages = frame
                .clone()
                .lazy()
                .filter(col(key.name()).eq(lit(gender.as_str())))
                .select([col(value.name())])
                .collect()?;
            let ages: Vec<f64> = ages.column(value.name())?.f64()?.into_iter().flatten().collect();
            Ok(Series {
                name: gender,
                data: SeriesData::Bins(stats::histogram(&ages, HISTOGRAM_BINS)),
            })
        })
        .collect::<crate::Result<Vec<Series>>>()?;

    Ok(ChartDescriptor::new(
        ChartKind::OverlaidHistogram {
            opacity: OVERLAY_OPACITY,
        },
        "Age Distribution by Gender",
        "Age",
        "Frequency",
        series,
    ))
}

/// Rows of a typed frame with a non-null `key`, grouped by it and reduced
/// with `agg` into a `Float64` value column.
///
/// A row with a null value still creates its group, so a group exists
/// exactly when some row carries its key.
fn per_group(frame: DataFrame, key: Field, agg: Expr) -> LazyFrame {
    frame
        .lazy()
        .filter(col(key.name()).is_not_null())
        .group_by([col(key.name())])
        .agg([agg.cast(DataType::Float64).alias(VALUE)])
}

/// `(key, value)` pairs of a collected per-group frame, in frame order
fn group_values(groups: &DataFrame, key: Field) -> crate::Result<Vec<(String, f64)>> {
    let keys = groups.column(key.name())?.str()?;
    let values = groups.column(VALUE)?.f64()?;
    Ok(keys
        .into_iter()
        .zip(values.into_iter())
        .filter_map(|(key, value)| key.map(|key| (key.to_string(), value.unwrap_or(UNDEFINED))))
        .collect())
}

fn bar(key: String, value: f64) -> GroupValue {
    GroupValue {
        key,
        value,
        percent: None,
    }
}

fn slices(parts: Vec<(String, f64)>) -> Vec<GroupValue> {
    let total: f64 = parts.iter().map(|(_, v)| v).sum();
    parts
        .into_iter()
        .map(|(key, value)| GroupValue {
            key,
            value,
            percent: Some(if total == 0.0 {
                UNDEFINED
            } else {
                value / total * 100.0
            }),
        })
        .collect()
}

fn grouped(name: &str, groups: Vec<GroupValue>) -> Series {
    Series {
        name: name.to_string(),
        data: SeriesData::Groups(groups),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    fn customers() -> Dataset {
        let frame = df!(
            "Age" => [25i64, 35, 45, 55, 65],
            "Gender" => ["Male", "Female", "Male", "Female", "Male"],
            "Subscription Type" => ["Basic", "Premium", "Basic", "Premium", "Basic"],
            "Contract Length" => ["Monthly", "Annual", "Annual", "Quarterly", "Monthly"],
            "Total Spend" => [100.0f64, 500.0, 200.0, 700.0, 300.0],
            "Churn" => [1i64, 0, 0, 1, 1]
        )
        .unwrap();
        Dataset::new(frame)
    }

    #[test]
    fn test_build_all_charts() {
        let charts = build_charts(&customers()).unwrap();
        let titles: Vec<&str> = charts.iter().map(|c| c.title.as_str()).collect();

        assert_eq!(charts.len(), 6);
        assert_eq!(titles[0], "Distribution of Age");
        assert_eq!(titles[5], "Age Distribution by Gender");
    }

    #[test]
    fn test_absent_groups_are_omitted() {
        let chart = average_spend_by_subscription(&customers()).unwrap();
        let groups = chart.series[0].groups();

        assert_eq!(chart.kind, ChartKind::Bar);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "Basic");
        assert_eq!(groups[0].value, 200.0);
        assert_eq!(groups[1].key, "Premium");
        assert_eq!(groups[1].value, 600.0);
    }

    #[test]
    fn test_gender_pie_counts_and_percentages() {
        let chart = gender_distribution(&customers()).unwrap();
        let slices = chart.series[0].groups();

        assert_eq!(slices[0].key, "Male");
        assert_eq!(slices[0].value, 3.0);
        assert_eq!(slices[0].percent, Some(60.0));
        assert_eq!(slices[1].percent, Some(40.0));
    }

    #[test]
    fn test_spend_by_contract_length() {
        let chart = spend_by_contract_length(&customers()).unwrap();
        let slices = chart.series[0].groups();
        let keys: Vec<&str> = slices.iter().map(|s| s.key.as_str()).collect();

        assert_eq!(keys, vec!["Annual", "Monthly", "Quarterly"]);
        assert_eq!(slices[0].value, 700.0);
        assert!((slices[0].percent.unwrap() - 700.0 / 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_churn_rate_by_gender() {
        let chart = churn_rate_by_gender(&customers()).unwrap();
        let bars = chart.series[0].groups();

        assert_eq!(bars[0].key, "Female");
        assert_eq!(bars[0].value, 50.0);
        assert_eq!(bars[1].key, "Male");
        assert!((bars[1].value - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_age_histograms() {
        let chart = age_distribution(&customers()).unwrap();
        let bins = chart.series[0].bins();
        assert_eq!(bins.len(), HISTOGRAM_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<u64>(), 5);

        let overlay = age_distribution_by_gender(&customers()).unwrap();
        assert_eq!(overlay.kind, ChartKind::OverlaidHistogram { opacity: 0.5 });
        assert_eq!(overlay.series.len(), 2);
        assert_eq!(overlay.series[0].name, "Female");
        assert_eq!(overlay.series[1].bins().iter().map(|b| b.count).sum::<u64>(), 3);
    }

    #[test]
    fn test_negative_spend_is_rejected() {
        let frame = df!(
            "Contract Length" => ["Annual", "Monthly"],
            "Total Spend" => [150.0f64, -50.0]
        )
        .unwrap();
        let err = spend_by_contract_length(&Dataset::new(frame)).unwrap_err();

        assert_eq!(err.column(), Some("Total Spend"));
    }

    #[test]
    fn test_nan_values_do_not_poison_groups() {
        let frame = df!(
            "Subscription Type" => ["Basic", "Basic", "Premium"],
            "Total Spend" => [f64::NAN, 300.0, 500.0]
        )
        .unwrap();
        let chart = average_spend_by_subscription(&Dataset::new(frame)).unwrap();
        let bars = chart.series[0].groups();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].value, 300.0);
        assert_eq!(bars[1].value, 500.0);
    }

    #[test]
    fn test_gender_ties_break_alphabetically() {
        let frame = df!("Gender" => ["Male", "Female", "Other", "Male", "Female"]).unwrap();
        let chart = gender_distribution(&Dataset::new(frame)).unwrap();
        let keys: Vec<&str> = chart.series[0].groups().iter().map(|g| g.key.as_str()).collect();

        assert_eq!(keys, vec!["Female", "Male", "Other"]);
    }

    #[test]
    fn test_null_keys_are_dropped() {
        let frame = df!(
            "Gender" => [Some("Male"), None, Some("Male")],
            "Churn" => [1i64, 1, 0]
        )
        .unwrap();
        let chart = churn_rate_by_gender(&Dataset::new(frame)).unwrap();

        assert_eq!(chart.series[0].groups().len(), 1);
        assert_eq!(chart.series[0].groups()[0].value, 50.0);
    }
}
