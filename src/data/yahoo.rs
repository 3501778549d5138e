//! Yahoo Finance Provider
//! Daily bars from the public v8 chart endpoint over a blocking HTTP client.
//!
//! Chart requests carry a crumb token tied to a session cookie. The cookie
//! comes from the consent host, the crumb from `v1/test/getcrumb`. Both are
//! fetched on first use and dropped when the chart answers 401 or 429.

use crate::config::AppConfig;
use crate::data::{MarketDataProvider, PriceBar, ProviderError};
use chrono::{DateTime, Days, NaiveDate, NaiveTime};
use reqwest::blocking::{Client, Request};
use reqwest::header::REFERER;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::Mutex;

const REFERER_URL: &str = "https://finance.yahoo.com/";

/// Yahoo chart API client.
pub struct YahooProvider {
    client: Client,
    base_url: String,
    cookie_url: String,
    crumb_url: String,
    crumb: Mutex<Option<String>>,
}

impl YahooProvider {
    pub fn new(config: &AppConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            cookie_url: config.cookie_url.clone(),
            crumb_url: config.crumb_url.clone(),
            crumb: Mutex::new(None),
        })
    }

    fn chart_url(&self, ticker: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Api(format!("bad base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Api(format!("bad base url {}", self.base_url)))?
            .push(ticker);
        Ok(url)
    }

    /// Build the chart request for an inclusive date range.
    ///
    /// The range is padded (one day before, two after) so exchange-local
    /// dates near midnight UTC are not lost; the fetcher clips afterwards.
    fn chart_request(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
        crumb: &str,
    ) -> Result<Request, ProviderError> {
        let period1 = day_start_unix(start.checked_sub_days(Days::new(1)).unwrap_or(start));
        let period2 = day_start_unix(end.checked_add_days(Days::new(2)).unwrap_or(end));

        let request = self
            .client
            .get(self.chart_url(ticker)?)
            .header(REFERER, REFERER_URL)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
                ("crumb", crumb.to_string()),
            ])
            .build()?;
        Ok(request)
    }

    fn cached_crumb(&self) -> Option<String> {
        self.crumb
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn store_crumb(&self, crumb: Option<String>) {
        *self
            .crumb
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = crumb;
    }

    /// Current crumb, fetching cookie and crumb when none is cached.
    fn crumb(&self) -> Result<String, ProviderError> {
        if let Some(crumb) = self.cached_crumb() {
            return Ok(crumb);
        }

        // The consent host answers 404 but still sets the session cookie
        let cookie = self
            .client
            .get(&self.cookie_url)
            .header(REFERER, REFERER_URL)
            .send()?;
        log::debug!("cookie from {}: HTTP {}", self.cookie_url, cookie.status());

        let response = self
            .client
            .get(&self.crumb_url)
            .header(REFERER, REFERER_URL)
            .send()?;
        let status = response.status();
        let crumb = parse_crumb(status, &response.text()?)?;

        log::info!("Obtained Yahoo crumb");
        self.store_crumb(Some(crumb.clone()));
        Ok(crumb)
    }

    fn send_chart(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(StatusCode, String), ProviderError> {
        let request = self.chart_request(ticker, start, end, &self.crumb()?)?;
        log::info!("GET {}", request.url());

        let response = self.client.execute(request)?;
        let status = response.status();
        Ok((status, response.text()?))
    }
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        let (status, body) = self.send_chart(ticker, start, end)?;
        log::debug!("{ticker}: HTTP {status}, {} bytes", body.len());

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::TOO_MANY_REQUESTS {
            // The next request starts a fresh session
            log::warn!("{ticker}: HTTP {status}, dropping cached crumb");
            self.store_crumb(None);
        }

        interpret_chart_response(ticker, status, &body)
    }
}

/// Validate a crumb endpoint answer.
pub(crate) fn parse_crumb(status: StatusCode, body: &str) -> Result<String, ProviderError> {
    let body = body.trim();
    if status == StatusCode::TOO_MANY_REQUESTS || body.to_lowercase().contains("too many requests") {
        return Err(ProviderError::RateLimited);
    }
    if !status.is_success() {
        return Err(ProviderError::Api(format!("crumb request failed: HTTP {status}")));
    }
    if body.is_empty() || body.len() >= 100 || body.contains(' ') || body.contains('<') {
        return Err(ProviderError::Malformed("unexpected crumb response".to_string()));
    }
    Ok(body.to_string())
}

/// Map a chart answer to bars, or to the error its status and body describe.
///
/// A JSON error payload wins over the status code; a body that is not a
/// chart document falls back to the HTTP status.
pub(crate) fn interpret_chart_response(
    ticker: &str,
    status: StatusCode,
    body: &str,
) -> Result<Vec<PriceBar>, ProviderError> {
    match parse_chart(ticker, body) {
        Ok(bars) => Ok(bars),
        Err(ProviderError::Malformed(_)) if status == StatusCode::TOO_MANY_REQUESTS => {
            Err(ProviderError::RateLimited)
        }
        Err(ProviderError::Malformed(_)) if !status.is_success() => {
            Err(ProviderError::Api(format!("HTTP {status}")))
        }
        Err(e) => Err(e),
    }
}

fn day_start_unix(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

// `chart` response schema
#[derive(Deserialize, Debug)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Deserialize, Debug)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize, Debug, Default)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Deserialize, Debug, Default)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Decode a chart response body into bars.
///
/// Rows with no price at all are placeholders and are dropped; other gaps
/// become `NaN` so they show up in the missing-value summary.
pub(crate) fn parse_chart(ticker: &str, body: &str) -> Result<Vec<PriceBar>, ProviderError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    if let Some(error) = envelope.chart.error {
        let description = error.description.unwrap_or_default();
        return if error.code.eq_ignore_ascii_case("Not Found") {
            Err(ProviderError::UnknownSymbol(ticker.to_string()))
        } else {
            Err(ProviderError::Api(format!("{}: {}", error.code, description)))
        };
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(ProviderError::UnknownSymbol(ticker.to_string()));
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let open = at(&quote.open, i);
            let high = at(&quote.high, i);
            let low = at(&quote.low, i);
            let close = at(&quote.close, i);
            if open.is_none() && high.is_none() && low.is_none() && close.is_none() {
                return None;
            }
            let date = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0)?.date_naive();
            Some(PriceBar {
                date,
                open: open.unwrap_or(f64::NAN),
                high: high.unwrap_or(f64::NAN),
                low: low.unwrap_or(f64::NAN),
                close: close.unwrap_or(f64::NAN),
                volume: at(&quote.volume, i).unwrap_or(f64::NAN),
            })
        })
        .collect::<Vec<_>>();

    if bars.len() < result.timestamp.len() {
        log::warn!(
            "[{ticker}] dropped {} empty rows from provider response",
            result.timestamp.len() - bars.len()
        );
    }

    Ok(bars)
}
