//! Market data provider abstraction.
//!
//! [`MarketDataProvider`] is the seam between the fetcher and a concrete
//! vendor. The production implementation is
//! [`YahooProvider`](crate::data::YahooProvider); tests plug in scripted
//! providers instead of hitting the network.

use crate::data::PriceBar;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by a provider implementation.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider does not know the symbol.
    #[error("Symbol not found: {0}")]
    UnknownSymbol(String),

    /// The provider answered with an error payload or status.
    #[error("Provider error: {0}")]
    Api(String),

    /// The provider is throttling us.
    #[error("Rate limited by provider")]
    RateLimited,

    /// The response body could not be understood.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Source of daily OHLCV bars.
pub trait MarketDataProvider: Send + Sync {
    /// Short name used in logs and the status line.
    fn name(&self) -> &str;

    /// Fetch daily bars for `ticker` covering the inclusive range.
    ///
    /// One call is one outbound request. Rows may come back unsorted and
    /// may spill outside the range; the fetcher normalizes them.
    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProviderError>;
}
