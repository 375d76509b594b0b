//! Undefined marker, scalar extraction and histogram binning

use polars::prelude::{DataFrame, DataType};
use serde::Serialize;

/// Marker reported for any statistic that is undefined (mean of nothing, std of one value).
pub const UNDEFINED: f64 = f64::NAN;

/// Whether `value` is the undefined marker
pub fn is_undefined(value: f64) -> bool {
    value.is_nan()
}

/// First value of `name` in a one-row aggregation result, undefined when null
pub fn scalar(frame: &DataFrame, name: &str) -> crate::Result<f64> {
    let value = frame.column(name)?.cast(&DataType::Float64)?;
    Ok(value.f64()?.get(0).unwrap_or(UNDEFINED))
}

/// One equal-width histogram bucket. The last bucket of a histogram is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Equal-width histogram over `[min, max]`.
///
/// A constant input spans `[v - 0.5, v + 0.5]` and an empty input spans
/// `[0, 1]`, so there are always `bins` buckets.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if bins == 0 {
        return Vec::new();
    }

    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let (mut low, mut high) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if finite.is_empty() {
        low = 0.0;
        high = 1.0;
    } else if low == high {
        low -= 0.5;
        high += 0.5;
    }

    let width = (high - low) / bins as f64;
    let mut counts = vec![0u64; bins];
    for v in &finite {
        let index = (((v - low) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: low + width * i as f64,
            upper: if i + 1 == bins {
                high
            } else {
                low + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::df;

    #[test]
    fn test_scalar_reads_first_row() {
        let frame = df!(
            "mean" => [Some(2.5f64)],
            "count" => [4u32],
            "std" => [None::<f64>]
        )
        .unwrap();

        assert_eq!(scalar(&frame, "mean").unwrap(), 2.5);
        assert_eq!(scalar(&frame, "count").unwrap(), 4.0);
        assert!(is_undefined(scalar(&frame, "std").unwrap()));
        assert!(scalar(&frame, "median").is_err());
    }

    #[test]
    fn test_histogram_bins() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0], 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[9].upper, 10.0);
        // the maximum falls into the closed last bucket
        assert_eq!(bins[9].count, 2);
        assert_eq!(bins.iter().map(|b| b.count).sum::<u64>(), 11);
    }

    #[test]
    fn test_histogram_degenerate_ranges() {
        let constant = histogram(&[42.0, 42.0], 10);
        assert_eq!(constant[0].lower, 41.5);
        assert_eq!(constant[9].upper, 42.5);
        assert_eq!(constant.iter().map(|b| b.count).sum::<u64>(), 2);

        let empty = histogram(&[], 10);
        assert_eq!(empty.len(), 10);
        assert_eq!(empty[0].lower, 0.0);
        assert_eq!(empty[9].upper, 1.0);
        assert!(empty.iter().all(|b| b.count == 0));
    }
}
