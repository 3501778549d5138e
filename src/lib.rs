//! Stock Viewer - daily OHLCV dashboard
//!
//! Fetches daily price bars for a ticker and date range, then shows them
//! as a raw table and a closing price chart with optional indicators.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod gui;
pub mod report;
pub mod stats;
pub mod view;
