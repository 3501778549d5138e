//! View Renderer
//! Turns a price series into the raw table and the close-price line chart.

use crate::data::{PriceBar, PriceSeries};
use chrono::NaiveDate;

pub const TABLE_HEADERS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

/// Formatted table cells, one row per bar.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<[String; 6]>,
}

/// Close price against date, element-for-element with the series.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<f64>,
}

impl LineChart {
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub table: TableView,
    pub chart: LineChart,
}

/// Render a series. Pure: the same input always yields the same output.
pub fn render(series: &PriceSeries) -> RenderedView {
    RenderedView {
        table: TableView {
            headers: TABLE_HEADERS.iter().map(|h| h.to_string()).collect(),
            rows: table_rows(series.bars()),
        },
        chart: LineChart {
            title: format!("{} Closing Price", series.ticker),
            x: series.dates(),
            y: series.closes(),
        },
    }
}

pub fn table_rows(bars: &[PriceBar]) -> Vec<[String; 6]> {
    bars.iter()
        .map(|bar| {
            [
                bar.date.format("%Y-%m-%d").to_string(),
                format_price(bar.open),
                format_price(bar.high),
                format_price(bar.low),
                format_price(bar.close),
                format_volume(bar.volume),
            ]
        })
        .collect()
}

pub fn format_price(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.2}")
    }
}

pub fn format_volume(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> PriceSeries {
        let bars = [(3, 125.07, 112117500.0), (4, 126.36, 89113600.0)]
            .iter()
            .map(|&(day, close, volume)| PriceBar {
                date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
                open: close - 1.0,
                high: close + 1.0,
                low: close - 2.0,
                close,
                volume,
            })
            .collect();
        PriceSeries::from_bars("AAPL", bars)
    }

    #[test]
    fn table_has_all_columns_and_rows() {
        let view = render(&series());
        assert_eq!(view.table.headers, TABLE_HEADERS.to_vec());
        assert_eq!(view.table.rows.len(), 2);
        assert_eq!(
            view.table.rows[0],
            [
                "2023-01-03".to_string(),
                "124.07".to_string(),
                "126.07".to_string(),
                "123.07".to_string(),
                "125.07".to_string(),
                "112117500".to_string(),
            ]
        );
    }

    #[test]
    fn chart_follows_close_column() {
        let s = series();
        let view = render(&s);
        assert_eq!(view.chart.x, s.dates());
        assert_eq!(view.chart.y, s.closes());
        assert_eq!(view.chart.title, "AAPL Closing Price");
    }

    #[test]
    fn missing_cells_render_as_nan() {
        assert_eq!(format_price(f64::NAN), "NaN");
        assert_eq!(format_volume(1234.4), "1234");
    }
}
