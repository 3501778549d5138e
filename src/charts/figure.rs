//! Figure Module
//! Backend-neutral chart description shared by the interactive plots and
//! the static PNG renderer.

use crate::data::{Metric, PriceSeries};
use crate::stats::Indicators;
use crate::view::LineChart;
use chrono::{Days, NaiveDate};

/// Plot x coordinate: days since 1970-01-01.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.signed_duration_since(NaiveDate::default()).num_days() as f64
}

/// Inverse of [`date_to_x`], for axis labels.
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    let days = x.round();
    if !days.is_finite() {
        return None;
    }
    if days >= 0.0 {
        NaiveDate::default().checked_add_days(Days::new(days as u64))
    } else {
        NaiveDate::default().checked_sub_days(Days::new((-days) as u64))
    }
}

// Colors (RGB)
pub const CLOSE_COLOR: [u8; 3] = [31, 119, 180];
pub const MA50_COLOR: [u8; 3] = [255, 127, 14];
pub const MA200_COLOR: [u8; 3] = [44, 160, 44];
pub const BAND_COLOR: [u8; 3] = [214, 39, 160];
pub const SIGNAL_COLOR: [u8; 3] = [255, 127, 14];
pub const HISTOGRAM_COLOR: [u8; 3] = [140, 140, 140];

pub const METRIC_COLORS: [[u8; 3]; 5] = [
    [46, 204, 113],  // Open
    [231, 76, 60],   // High
    [155, 89, 182],  // Low
    CLOSE_COLOR,     // Close
    [127, 127, 127], // Volume
];

pub fn metric_color(metric: Metric) -> [u8; 3] {
    let idx = Metric::ALL.iter().position(|m| *m == metric).unwrap_or(0);
    METRIC_COLORS[idx]
}

/// One polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub color: [u8; 3],
    pub width: f32,
    pub dashed: bool,
}

impl Trace {
    fn new(name: &str, points: Vec<[f64; 2]>, color: [u8; 3], width: f32) -> Self {
        Self {
            name: name.to_string(),
            points,
            color,
            width,
            dashed: false,
        }
    }

    fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }
}

/// Vertical bars anchored at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BarTrace {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Figure {
    pub title: String,
    pub y_label: String,
    pub lines: Vec<Trace>,
    pub bars: Vec<BarTrace>,
}

impl Figure {
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.points.is_empty())
            && self.bars.iter().all(|b| b.points.is_empty())
    }

    /// (min, max) of all x values.
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        self.bounds(0)
    }

    /// (min, max) of all y values; bars include their zero baseline.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        let (mut lo, mut hi) = self.bounds(1)?;
        if !self.bars.is_empty() {
            lo = lo.min(0.0);
            hi = hi.max(0.0);
        }
        Some((lo, hi))
    }

    fn bounds(&self, axis: usize) -> Option<(f64, f64)> {
        let values = self
            .lines
            .iter()
            .flat_map(|l| l.points.iter())
            .chain(self.bars.iter().flat_map(|b| b.points.iter()))
            .map(|p| p[axis])
            .filter(|v| v.is_finite());

        values.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Which main chart to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewType {
    Single,
    Multi,
}

impl Default for ViewType {
    fn default() -> Self {
        ViewType::Single
    }
}

/// Chart controls that do not require a new fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub view_type: ViewType,
    pub metric: Metric,
    pub metrics: Vec<Metric>,
    pub show_bollinger: bool,
    pub show_macd: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            view_type: ViewType::Single,
            metric: Metric::Close,
            metrics: vec![Metric::Close, Metric::Open, Metric::High],
            show_bollinger: true,
            show_macd: true,
        }
    }
}

/// Gaps (NaN) are left out so no backend draws through them.
fn points_from(dates: &[NaiveDate], values: &[f64]) -> Vec<[f64; 2]> {
    dates
        .iter()
        .zip(values.iter())
        .filter(|(_, v)| v.is_finite())
        .map(|(d, v)| [date_to_x(*d), *v])
        .collect()
}

fn points_from_opt(dates: &[NaiveDate], values: &[Option<f64>]) -> Vec<[f64; 2]> {
    dates
        .iter()
        .zip(values.iter())
        .filter_map(|(d, v)| v.filter(|v| v.is_finite()).map(|v| [date_to_x(*d), v]))
        .collect()
}

/// The close line exactly as rendered by the view.
pub fn close_trace(chart: &LineChart) -> Trace {
    let points = chart
        .points()
        .filter(|(_, close)| close.is_finite())
        .map(|(date, close)| [date_to_x(date), close])
        .collect();
    Trace::new("Close", points, CLOSE_COLOR, 2.0)
}

/// Build the main chart for the current options.
pub fn main_figure(
    series: &PriceSeries,
    chart: &LineChart,
    indicators: &Indicators,
    options: &ChartOptions,
) -> Figure {
    match options.view_type {
        ViewType::Single => single_metric_figure(series, chart, indicators, options),
        ViewType::Multi => multi_metric_figure(series, &options.metrics),
    }
}

fn single_metric_figure(
    series: &PriceSeries,
    chart: &LineChart,
    indicators: &Indicators,
    options: &ChartOptions,
) -> Figure {
    let dates = &chart.x;
    let mut figure = Figure {
        title: format!("{} - {}", series.ticker, options.metric.label()),
        y_label: options.metric.label().to_string(),
        ..Default::default()
    };

    if options.metric != Metric::Close {
        figure.lines.push(Trace::new(
            options.metric.label(),
            points_from(dates, &series.column(options.metric)),
            metric_color(options.metric),
            2.0,
        ));
        return figure;
    }

    figure.lines.push(close_trace(chart));
    figure.lines.push(Trace::new(
        "MA50",
        points_from_opt(dates, &indicators.ma50),
        MA50_COLOR,
        1.5,
    ));
    figure.lines.push(Trace::new(
        "MA200",
        points_from_opt(dates, &indicators.ma200),
        MA200_COLOR,
        1.5,
    ));

    if options.show_bollinger {
        figure.lines.push(
            Trace::new("BB Upper", points_from_opt(dates, &indicators.bb_upper), BAND_COLOR, 1.0)
                .dashed(),
        );
        figure.lines.push(
            Trace::new("BB Lower", points_from_opt(dates, &indicators.bb_lower), BAND_COLOR, 1.0)
                .dashed(),
        );
        figure.lines.push(Trace::new(
            "BB MA (20)",
            points_from_opt(dates, &indicators.bb_mid),
            MA50_COLOR,
            1.0,
        ));
    }

    figure
}

/// Several metrics on one axis; volume is rescaled to the price range.
pub fn multi_metric_figure(series: &PriceSeries, metrics: &[Metric]) -> Figure {
    let dates = series.dates();
    let mut figure = Figure {
        title: format!("{} - Multiple metrics", series.ticker),
        y_label: "Price".to_string(),
        ..Default::default()
    };

    for &metric in Metric::ALL.iter().filter(|m| metrics.contains(m)) {
        let values = if metric == Metric::Volume {
            scaled_volume(series)
        } else {
            series.column(metric)
        };
        figure.lines.push(Trace::new(
            metric.label(),
            points_from(&dates, &values),
            metric_color(metric),
            1.5,
        ));
    }

    figure
}

/// `volume / max(volume) * max(OHLC)` so volume shares the price axis.
pub fn scaled_volume(series: &PriceSeries) -> Vec<f64> {
    let nan_max = |values: Vec<f64>| values.into_iter().filter(|v| !v.is_nan()).fold(f64::NAN, f64::max);

    let max_price = Metric::PRICES
        .iter()
        .map(|m| nan_max(series.column(*m)))
        .fold(f64::NAN, f64::max);
    let volume = series.column(Metric::Volume);
    let max_volume = nan_max(volume.clone());

    if max_volume.is_nan() || max_volume <= 0.0 || max_price.is_nan() {
        return vec![0.0; volume.len()];
    }
    volume.iter().map(|v| v / max_volume * max_price).collect()
}

/// MACD line, signal line and histogram bars.
pub fn macd_figure(series: &PriceSeries, indicators: &Indicators) -> Figure {
    let dates = series.dates();
    Figure {
        title: format!("{} - MACD", series.ticker),
        y_label: "MACD".to_string(),
        lines: vec![
            Trace::new("MACD", points_from(&dates, &indicators.macd), CLOSE_COLOR, 1.5),
            Trace::new("Signal", points_from(&dates, &indicators.signal), SIGNAL_COLOR, 1.5),
        ],
        bars: vec![BarTrace {
            name: "Histogram".to_string(),
            points: points_from(&dates, &indicators.histogram),
            color: HISTOGRAM_COLOR,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceBar;
    use crate::view;

    fn series(n: u64) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = (0..n)
            .map(|i| PriceBar {
                date: start.checked_add_days(Days::new(i)).unwrap(),
                open: 10.0 + i as f64,
                high: 12.0 + i as f64,
                low: 9.0 + i as f64,
                close: 11.0 + i as f64,
                volume: 1000.0 * (i + 1) as f64,
            })
            .collect();
        PriceSeries::from_bars("AAPL", bars)
    }

    #[test]
    fn date_axis_round_trips() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 10).unwrap();
        assert_eq!(date_to_x(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 1.0);
        assert_eq!(x_to_date(date_to_x(d)), Some(d));
        assert_eq!(x_to_date(f64::NAN), None);
    }

    #[test]
    fn close_trace_matches_series() {
        let s = series(5);
        let rendered = view::render(&s);
        let trace = close_trace(&rendered.chart);
        let xs: Vec<NaiveDate> = trace.points.iter().filter_map(|p| x_to_date(p[0])).collect();
        let ys: Vec<f64> = trace.points.iter().map(|p| p[1]).collect();
        assert_eq!(xs, s.dates());
        assert_eq!(ys, s.closes());
    }

    #[test]
    fn close_view_adds_overlays_when_requested() {
        let s = series(30);
        let rendered = view::render(&s);
        let ind = Indicators::compute(&s);
        let mut options = ChartOptions::default();

        let fig = main_figure(&s, &rendered.chart, &ind, &options);
        let names: Vec<&str> = fig.lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Close", "MA50", "MA200", "BB Upper", "BB Lower", "BB MA (20)"]);
        // 20-day bands start on the 20th bar
        assert_eq!(fig.lines[3].points.len(), 11);
        assert!(fig.lines[1].points.is_empty());

        options.show_bollinger = false;
        let fig = main_figure(&s, &rendered.chart, &ind, &options);
        assert_eq!(fig.lines.len(), 3);
    }

    #[test]
    fn missing_closes_are_skipped_not_drawn() {
        let mut bars = series(5).bars().to_vec();
        bars[2].close = f64::NAN;
        bars[3].open = f64::NAN;
        let gappy = PriceSeries::from_bars("GAP", bars);
        let rendered = view::render(&gappy);

        let trace = close_trace(&rendered.chart);
        assert_eq!(trace.points.len(), 4);
        assert!(trace.points.iter().all(|p| p[1].is_finite()));

        let multi = multi_metric_figure(&gappy, &[Metric::Open, Metric::Close]);
        assert_eq!(multi.lines[0].points.len(), 4);
        assert_eq!(multi.lines[1].points.len(), 4);
        let (lo, hi) = multi.y_bounds().unwrap();
        assert!(lo.is_finite() && hi.is_finite());
    }

    #[test]
    fn other_single_metric_is_a_single_line() {
        let s = series(3);
        let rendered = view::render(&s);
        let options = ChartOptions {
            metric: Metric::Volume,
            ..Default::default()
        };
        let fig = main_figure(&s, &rendered.chart, &Indicators::compute(&s), &options);
        assert_eq!(fig.lines.len(), 1);
        assert_eq!(fig.lines[0].points[2][1], 3000.0);
        assert_eq!(fig.title, "AAPL - Volume");
    }

    #[test]
    fn volume_is_scaled_to_price_range() {
        let s = series(3);
        // max price is the last high (14.0), max volume 3000
        let scaled = scaled_volume(&s);
        for (got, want) in scaled.iter().zip([14.0 / 3.0, 28.0 / 3.0, 14.0]) {
            assert!((got - want).abs() < 1e-9);
        }

        let fig = multi_metric_figure(&s, &[Metric::Volume, Metric::Close]);
        let names: Vec<&str> = fig.lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Close", "Volume"]);
    }

    #[test]
    fn macd_histogram_bounds_include_zero() {
        let s = series(40);
        let fig = macd_figure(&s, &Indicators::compute(&s));
        assert_eq!(fig.bars[0].points.len(), 40);
        let (lo, hi) = fig.y_bounds().unwrap();
        assert!(lo <= 0.0 && hi >= 0.0);
    }
}
