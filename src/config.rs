//! Application Configuration
//! Reads startup settings from the environment (and `.env` via dotenv).

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TICKER: &str = "AAPL";
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
pub const DEFAULT_CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: String, value: String },
}

/// Startup settings for the viewer.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_ticker: String,
    pub lookback_days: i64,
    pub base_url: String,
    /// Page that hands out the session cookie.
    pub cookie_url: String,
    /// Endpoint returning the crumb token sent with chart requests.
    pub crumb_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_ticker: DEFAULT_TICKER.to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_url: DEFAULT_COOKIE_URL.to_string(),
            crumb_url: DEFAULT_CRUMB_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("stock-viewer/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AppConfig {
    /// Build the config from process environment variables.
    ///
    /// Unparseable numbers are logged and replaced by their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ticker) = lookup("STOCK_VIEWER_TICKER") {
            let ticker = ticker.trim();
            if !ticker.is_empty() {
                config.default_ticker = ticker.to_uppercase();
            }
        }

        match parse_var::<i64>(&lookup, "STOCK_VIEWER_LOOKBACK_DAYS") {
            Ok(Some(days)) if days > 0 => config.lookback_days = days,
            Ok(Some(days)) => log::warn!("Ignoring non-positive lookback of {days} days"),
            Ok(None) => {}
            Err(e) => log::warn!("{e}; using {DEFAULT_LOOKBACK_DAYS}"),
        }

        if let Some(url) = lookup("STOCK_VIEWER_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("STOCK_VIEWER_COOKIE_URL") {
            config.cookie_url = url.trim().to_string();
        }
        if let Some(url) = lookup("STOCK_VIEWER_CRUMB_URL") {
            config.crumb_url = url.trim().to_string();
        }

        match parse_var::<u64>(&lookup, "STOCK_VIEWER_TIMEOUT_SECS") {
            Ok(Some(secs)) => config.timeout = Duration::from_secs(secs),
            Ok(None) => {}
            Err(e) => log::warn!("{e}; using {DEFAULT_TIMEOUT_SECS}s"),
        }

        if let Some(agent) = lookup("USER_AGENT") {
            config.user_agent = agent;
        }

        config
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name: name.to_string(),
                value: raw,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.default_ticker, "AAPL");
        assert_eq!(config.lookback_days, 365);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.cookie_url, DEFAULT_COOKIE_URL);
        assert_eq!(config.crumb_url, DEFAULT_CRUMB_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("STOCK_VIEWER_TICKER", " infy.bo "),
            ("STOCK_VIEWER_LOOKBACK_DAYS", "30"),
            ("STOCK_VIEWER_BASE_URL", "http://localhost:9000/chart/"),
            ("STOCK_VIEWER_TIMEOUT_SECS", "5"),
            ("USER_AGENT", "tester"),
            ("STOCK_VIEWER_COOKIE_URL", "http://localhost:9000/cookie"),
            ("STOCK_VIEWER_CRUMB_URL", " http://localhost:9000/crumb "),
        ]));
        assert_eq!(config.cookie_url, "http://localhost:9000/cookie");
        assert_eq!(config.crumb_url, "http://localhost:9000/crumb");
        assert_eq!(config.default_ticker, "INFY.BO");
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.base_url, "http://localhost:9000/chart");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "tester");
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("STOCK_VIEWER_LOOKBACK_DAYS", "a year"),
            ("STOCK_VIEWER_TIMEOUT_SECS", "-1"),
        ]));
        assert_eq!(config.lookback_days, DEFAULT_LOOKBACK_DAYS);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
