//! Price Series Module
//! Daily OHLCV bars for one ticker, kept in chronological order.

use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One trading day of OHLCV data.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A column of the price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Close
    }
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Open,
        Metric::High,
        Metric::Low,
        Metric::Close,
        Metric::Volume,
    ];

    /// The four price columns (everything except volume).
    pub const PRICES: [Metric; 4] = [Metric::Open, Metric::High, Metric::Low, Metric::Close];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Open => "Open",
            Metric::High => "High",
            Metric::Low => "Low",
            Metric::Close => "Close",
            Metric::Volume => "Volume",
        }
    }

    pub fn value(&self, bar: &PriceBar) -> f64 {
        match self {
            Metric::Open => bar.open,
            Metric::High => bar.high,
            Metric::Low => bar.low,
            Metric::Close => bar.close,
            Metric::Volume => bar.volume,
        }
    }
}

/// Chronological, date-unique daily bars for a ticker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PriceSeries {
    pub ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from provider rows in any order.
    ///
    /// Rows are sorted by date; when a date repeats the last row wins.
    pub fn from_bars(ticker: &str, bars: Vec<PriceBar>) -> Self {
        let by_date: BTreeMap<NaiveDate, PriceBar> =
            bars.into_iter().map(|bar| (bar.date, bar)).collect();

        Self {
            ticker: ticker.to_string(),
            bars: by_date.into_values().collect(),
        }
    }

    /// Keep only bars within the inclusive date range.
    pub fn clip(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.bars.retain(|bar| bar.date >= start && bar.date <= end);
        self
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|bar| bar.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.column(Metric::Close)
    }

    /// All values of one column, in date order.
    pub fn column(&self, metric: Metric) -> Vec<f64> {
        self.bars.iter().map(|bar| metric.value(bar)).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|bar| bar.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|bar| bar.date)
    }

    /// The first `n` bars.
    pub fn head(&self, n: usize) -> &[PriceBar] {
        &self.bars[..n.min(self.bars.len())]
    }

    /// The last `n` bars.
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000.0 * day as f64,
        }
    }

    #[test]
    fn bars_are_sorted_and_deduplicated() {
        let series = PriceSeries::from_bars(
            "AAPL",
            vec![bar(5, 10.0), bar(3, 8.0), bar(4, 9.0), bar(3, 8.5)],
        );
        let days: Vec<u32> = series
            .dates()
            .iter()
            .map(|d| chrono::Datelike::day(d))
            .collect();
        assert_eq!(days, vec![3, 4, 5]);
        // later duplicate replaces earlier one
        assert_eq!(series.closes(), vec![8.5, 9.0, 10.0]);
    }

    #[test]
    fn clip_is_inclusive() {
        let series = PriceSeries::from_bars("AAPL", (1..=9).map(|d| bar(d, d as f64)).collect());
        let clipped = series.clip(
            NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 6).unwrap(),
        );
        assert_eq!(clipped.closes(), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn head_and_tail_saturate() {
        let series = PriceSeries::from_bars("AAPL", vec![bar(2, 1.0), bar(3, 2.0)]);
        assert_eq!(series.head(5).len(), 2);
        assert_eq!(series.tail(1)[0].close, 2.0);
        assert!(PriceSeries::default().tail(5).is_empty());
    }
}
