//! Technical Indicators
//! Moving averages, Bollinger bands and MACD over the close series.
//!
//! Rolling windows yield `None` until they are full. EMAs use the recursive
//! form `y[t] = a*x[t] + (1-a)*y[t-1]` seeded with the first value, with
//! `a = 2 / (span + 1)`.

use crate::data::PriceSeries;
use statrs::statistics::Statistics;

pub const MA_SHORT: usize = 50;
pub const MA_LONG: usize = 200;
pub const BOLLINGER_WINDOW: usize = 20;
pub const BOLLINGER_STDS: f64 = 2.0;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Indicator columns aligned index-for-index with the series bars.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Indicators {
    pub ma50: Vec<Option<f64>>,
    pub ma200: Vec<Option<f64>>,
    pub bb_mid: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Indicators {
    pub fn compute(series: &PriceSeries) -> Self {
        let close = series.closes();

        let ma50 = rolling_mean(&close, MA_SHORT);
        let ma200 = rolling_mean(&close, MA_LONG);
        let (bb_mid, bb_upper, bb_lower) = bollinger(&close, BOLLINGER_WINDOW, BOLLINGER_STDS);
        let (macd, signal, histogram) = macd(&close, MACD_FAST, MACD_SLOW, MACD_SIGNAL);

        Self {
            ma50,
            ma200,
            bb_mid,
            bb_upper,
            bb_lower,
            macd,
            signal,
            histogram,
        }
    }

    /// Export columns in a fixed order.
    pub fn named_columns(&self) -> Vec<(&'static str, Vec<Option<f64>>)> {
        let wrap = |v: &[f64]| v.iter().copied().map(Some).collect::<Vec<_>>();
        vec![
            ("MA50", self.ma50.clone()),
            ("MA200", self.ma200.clone()),
            ("BB_MA", self.bb_mid.clone()),
            ("BB_upper", self.bb_upper.clone()),
            ("BB_lower", self.bb_lower.clone()),
            ("MACD", wrap(&self.macd)),
            ("Signal", wrap(&self.signal)),
            ("Histogram", wrap(&self.histogram)),
        ]
    }
}

/// Simple moving average over a trailing window.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().mean())
}

/// Sample standard deviation over a trailing window.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().std_dev())
}

fn rolling<F>(values: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let w = &values[i + 1 - window..=i];
            if w.iter().any(|v| v.is_nan()) {
                None
            } else {
                Some(f(w))
            }
        })
        .collect()
}

/// Bollinger bands: (middle, upper, lower).
pub fn bollinger(
    values: &[f64],
    window: usize,
    stds: f64,
) -> (Vec<Option<f64>>, Vec<Option<f64>>, Vec<Option<f64>>) {
    let mid = rolling_mean(values, window);
    let sd = rolling_std(values, window);

    let band = |sign: f64| -> Vec<Option<f64>> {
        mid.iter()
            .zip(sd.iter())
            .map(|(m, s)| Some(m.as_ref()? + sign * stds * s.as_ref()?))
            .collect()
    };
    let upper = band(1.0);
    let lower = band(-1.0);

    (mid, upper, lower)
}

/// Exponential moving average (recursive form, seeded with the first value).
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &x in values {
        let next = match prev {
            None => x,
            Some(p) if x.is_nan() => p,
            Some(p) if p.is_nan() => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// MACD line, signal line and histogram.
pub fn macd(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);
    let line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&line, signal);
    let histogram = line
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| m - s)
        .collect();
    (line, signal_line, histogram)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn rolling_mean_waits_for_full_window() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn rolling_std_is_sample_std() {
        let out = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        // sample variance of this classic set is 32/7
        assert!(approx(out[7].unwrap(), (32.0f64 / 7.0).sqrt()));
    }

    #[test]
    fn bollinger_bands_straddle_the_mean() {
        let values = [10.0, 11.0, 12.0, 11.0, 10.0];
        let (mid, upper, lower) = bollinger(&values, 3, 2.0);
        assert_eq!(mid[1], None);
        let m = mid[2].unwrap();
        assert!(approx(m, 11.0));
        assert!(approx(upper[2].unwrap() - m, 2.0));
        assert!(approx(m - lower[2].unwrap(), 2.0));
    }

    #[test]
    fn ema_matches_recursive_definition() {
        let out = ema(&[1.0, 2.0, 3.0], 3);
        // alpha = 0.5
        assert_eq!(out, vec![1.0, 1.5, 2.25]);
    }

    #[test]
    fn macd_of_constant_series_is_flat() {
        let (line, signal, hist) = macd(&[5.0; 40], 12, 26, 9);
        assert!(line.iter().all(|v| approx(*v, 0.0)));
        assert!(signal.iter().all(|v| approx(*v, 0.0)));
        assert!(hist.iter().all(|v| approx(*v, 0.0)));
    }

    #[test]
    fn indicator_columns_align_with_series() {
        use crate::data::{PriceBar, PriceSeries};
        use chrono::{Days, NaiveDate};

        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let bars = (0..30)
            .map(|i| PriceBar {
                date: start.checked_add_days(Days::new(i)).unwrap(),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: i as f64,
                volume: 1.0,
            })
            .collect();
        let ind = Indicators::compute(&PriceSeries::from_bars("T", bars));
        assert_eq!(ind.ma50.len(), 30);
        assert!(ind.ma50.iter().all(Option::is_none));
        assert_eq!(ind.bb_mid[19], Some(9.5));
        assert_eq!(ind.named_columns().len(), 8);
    }
}
