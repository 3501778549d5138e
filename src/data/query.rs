//! Query Module
//! User-facing request for a ticker over a calendar date range.

use chrono::{Months, NaiveDate};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Ticker symbol must not be empty")]
    EmptyTicker,
    #[error("Start Date ({start}) must be before or equal to End Date ({end})")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
}

/// Ticker plus inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Query {
    /// Create a query with the ticker normalized (trimmed, upper-cased).
    pub fn new(ticker: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            ticker: ticker.trim().to_uppercase(),
            start,
            end,
        }
    }

    /// Check the local invariants. Whether the symbol exists is up to the provider.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.ticker.is_empty() {
            return Err(QueryError::EmptyTicker);
        }
        if self.start > self.end {
            return Err(QueryError::StartAfterEnd {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Whether a date falls inside the inclusive range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Quick range selections offered next to the date pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
}

impl RangePreset {
    pub const ALL: [RangePreset; 4] = [
        RangePreset::OneYear,
        RangePreset::TwoYears,
        RangePreset::FiveYears,
        RangePreset::TenYears,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RangePreset::OneYear => "1Y",
            RangePreset::TwoYears => "2Y",
            RangePreset::FiveYears => "5Y",
            RangePreset::TenYears => "10Y",
        }
    }

    fn years(&self) -> u32 {
        match self {
            RangePreset::OneYear => 1,
            RangePreset::TwoYears => 2,
            RangePreset::FiveYears => 5,
            RangePreset::TenYears => 10,
        }
    }

    /// Start date that covers this preset ending on `end`.
    ///
    /// Feb 29 anchors clamp to Feb 28 in non-leap years.
    pub fn start_for(&self, end: NaiveDate) -> NaiveDate {
        end.checked_sub_months(Months::new(12 * self.years()))
            .unwrap_or(NaiveDate::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn ticker_is_normalized() {
        let q = Query::new("  aapl ", date(2023, 1, 1), date(2023, 1, 10));
        assert_eq!(q.ticker, "AAPL");
        assert!(q.validate().is_ok());
    }

    #[test]
    fn start_after_end_is_rejected() {
        let q = Query::new("AAPL", date(2023, 2, 1), date(2023, 1, 1));
        assert_eq!(
            q.validate(),
            Err(QueryError::StartAfterEnd {
                start: date(2023, 2, 1),
                end: date(2023, 1, 1)
            })
        );
    }

    #[test]
    fn single_day_range_is_valid() {
        let q = Query::new("MSFT", date(2023, 1, 3), date(2023, 1, 3));
        assert!(q.validate().is_ok());
        assert!(q.contains(date(2023, 1, 3)));
        assert!(!q.contains(date(2023, 1, 4)));
    }

    #[test]
    fn blank_ticker_is_rejected() {
        let q = Query::new("   ", date(2023, 1, 1), date(2023, 1, 2));
        assert_eq!(q.validate(), Err(QueryError::EmptyTicker));
    }

    #[test]
    fn presets_subtract_whole_years() {
        let end = date(2024, 2, 29);
        assert_eq!(RangePreset::OneYear.start_for(end), date(2023, 2, 28));
        assert_eq!(RangePreset::FiveYears.start_for(date(2024, 6, 15)), date(2019, 6, 15));
        assert_eq!(RangePreset::TenYears.label(), "10Y");
    }
}
