//! Dashboard Pipeline
//! Recomputes the whole view from the current inputs: validate, fetch, render.

use crate::data::{DataFetcher, FetchError, PriceBar, PriceSeries, Query};
use crate::stats::{ColumnSummary, Indicators, StatsCalculator};
use crate::view::{self, RenderedView};

/// Rows shown in the "first rows" preview.
pub const PREVIEW_ROWS: usize = 5;

/// Everything derived from one fetched series.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub query: Query,
    pub source: String,
    pub series: PriceSeries,
    pub rendered: RenderedView,
    pub indicators: Indicators,
    pub summary: Vec<ColumnSummary>,
}

impl Snapshot {
    /// Derive table, chart, indicators and summary from a series.
    pub fn build(query: Query, source: &str, series: PriceSeries) -> Self {
        let rendered = view::render(&series);
        let indicators = Indicators::compute(&series);
        let summary = StatsCalculator::summarize(&series);

        Self {
            query,
            source: source.to_string(),
            series,
            rendered,
            indicators,
            summary,
        }
    }

    pub fn head(&self) -> &[PriceBar] {
        self.series.head(PREVIEW_ROWS)
    }
}

/// What the central panel shows.
#[derive(Debug, Clone)]
pub enum DashboardView {
    /// Nothing requested yet.
    Empty,
    /// The inputs break a local constraint; no fetch was made.
    Invalid(String),
    /// The provider could not supply data.
    Unavailable(String),
    Ready(Box<Snapshot>),
}

impl DashboardView {
    pub fn snapshot(&self) -> Option<&Snapshot> {
        match self {
            DashboardView::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }
}

/// Run the full pipeline for one query.
pub fn refresh(fetcher: &DataFetcher, query: &Query) -> DashboardView {
    match fetcher.fetch(query) {
        Ok(series) => DashboardView::Ready(Box::new(Snapshot::build(
            query.clone(),
            fetcher.provider_name(),
            series,
        ))),
        Err(FetchError::Invalid(e)) => {
            log::info!("Rejected query: {e}");
            DashboardView::Invalid(e.to_string())
        }
        Err(e @ FetchError::Unavailable(_)) => {
            log::warn!("{e}");
            DashboardView::Unavailable(e.to_string())
        }
    }
}

/// Show an already loaded series (CSV import) through the same pipeline.
pub fn from_series(query: &Query, source: &str, series: PriceSeries) -> DashboardView {
    if let Err(e) = query.validate() {
        return DashboardView::Invalid(e.to_string());
    }
    let series = series.clip(query.start, query.end);
    if series.is_empty() {
        return DashboardView::Unavailable(format!(
            "No data available: {source} has no rows between {} and {}",
            query.start, query.end
        ));
    }
    DashboardView::Ready(Box::new(Snapshot::build(query.clone(), source, series)))
}
