//! Data module - Queries, price series, providers and CSV I/O

mod fetcher;
mod loader;
mod provider;
mod query;
mod series;
mod yahoo;

pub use fetcher::{DataFetcher, DataUnavailable, FetchError};
pub use loader::{DataLoader, LoaderError};
pub use provider::{MarketDataProvider, ProviderError};
pub use query::{Query, QueryError, RangePreset};
pub use series::{Metric, PriceBar, PriceSeries};
pub use yahoo::YahooProvider;
