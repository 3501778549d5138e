//! Data Fetcher Module
//! Turns a validated query into a clean price series via a provider.

use crate::data::{MarketDataProvider, PriceSeries, ProviderError, Query, QueryError};
use chrono::NaiveDate;
use std::sync::Arc;
use thiserror::Error;

/// Why no series could be produced for a valid query.
#[derive(Error, Debug)]
pub enum DataUnavailable {
    #[error("unknown ticker '{0}'")]
    UnknownTicker(String),
    #[error("no trading days for {ticker} between {start} and {end}")]
    NoTradingDays {
        ticker: String,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("market data service unreachable: {0}")]
    Unreachable(String),
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{0}")]
    Invalid(#[from] QueryError),
    #[error("No data available: {0}")]
    Unavailable(#[from] DataUnavailable),
}

/// Fetches one query at a time from a shared provider.
#[derive(Clone)]
pub struct DataFetcher {
    provider: Arc<dyn MarketDataProvider>,
}

impl DataFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Validate, make a single provider call, and normalize the rows.
    ///
    /// The returned series is chronological, date-unique, and within range.
    pub fn fetch(&self, query: &Query) -> Result<PriceSeries, FetchError> {
        query.validate()?;

        log::info!(
            "Fetching {} {}..{} from {}",
            query.ticker,
            query.start,
            query.end,
            self.provider.name()
        );

        let bars = self
            .provider
            .fetch_daily(&query.ticker, query.start, query.end)
            .map_err(|e| {
                log::warn!("[{}] provider failed: {e}", query.ticker);
                match e {
                    ProviderError::UnknownSymbol(symbol) => DataUnavailable::UnknownTicker(symbol),
                    other => DataUnavailable::Unreachable(other.to_string()),
                }
            })?;

        let series = PriceSeries::from_bars(&query.ticker, bars).clip(query.start, query.end);
        if series.is_empty() {
            return Err(DataUnavailable::NoTradingDays {
                ticker: query.ticker.clone(),
                start: query.start,
                end: query.end,
            }
            .into());
        }

        log::info!("[{}] {} trading days", query.ticker, series.len());
        Ok(series)
    }
}
