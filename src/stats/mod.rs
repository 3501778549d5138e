//! Stats module - Descriptive statistics and technical indicators

mod calculator;
mod indicators;

pub use calculator::{ColumnSummary, StatsCalculator};
pub use indicators::{bollinger, ema, macd, rolling_mean, rolling_std, Indicators};
