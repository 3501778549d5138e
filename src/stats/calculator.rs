//! Statistics Calculator Module
//! Descriptive summary and missing-value counts for each price column.

use crate::data::{Metric, PriceSeries};
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// Descriptive statistics for one column (NaN cells excluded).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub metric: Metric,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
    pub missing: usize,
}

impl ColumnSummary {
    fn empty(metric: Metric, missing: usize) -> Self {
        Self {
            metric,
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
            missing,
        }
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Summarize one column of values.
    pub fn describe(metric: Metric, values: &[f64]) -> ColumnSummary {
        let present: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let missing = values.len() - present.len();
        let n = present.len();
        if n == 0 {
            return ColumnSummary::empty(metric, missing);
        }

        let mut sorted = present.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let std = if n > 1 { present.iter().std_dev() } else { f64::NAN };

        ColumnSummary {
            metric,
            count: n,
            mean: present.iter().mean(),
            std,
            min: sorted[0],
            p25: Self::percentile(&sorted, 25.0),
            median: Self::percentile(&sorted, 50.0),
            p75: Self::percentile(&sorted, 75.0),
            max: sorted[n - 1],
            missing,
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Summaries for all OHLCV columns, computed in parallel, in column order.
    pub fn summarize(series: &PriceSeries) -> Vec<ColumnSummary> {
        Metric::ALL
            .par_iter()
            .map(|&metric| Self::describe(metric, &series.column(metric)))
            .collect()
    }
}
