//! Static Chart Renderer
//! Renders figures to PNG with plotters, for file export and the PPT report.

use crate::charts::{x_to_date, Figure};
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Nothing to draw")]
    EmptyFigure,
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Pad a value range so lines do not touch the frame.
    pub fn padded_range(lo: f64, hi: f64) -> (f64, f64) {
        let span = hi - lo;
        if span.abs() < f64::EPSILON {
            let pad = if lo.abs() > 0.0 { lo.abs() * 0.05 } else { 1.0 };
            return (lo - pad, hi + pad);
        }
        (lo - span * 0.05, hi + span * 0.05)
    }

    /// Render a figure into raw RGB pixels.
    pub fn render_rgb(figure: &Figure, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        if figure.is_empty() {
            return Err(RenderError::EmptyFigure);
        }
        let (x_lo, x_hi) = figure.x_bounds().ok_or(RenderError::EmptyFigure)?;
        let (y_lo, y_hi) = figure.y_bounds().ok_or(RenderError::EmptyFigure)?;
        let (x_lo, x_hi) = Self::padded_range(x_lo, x_hi);
        let (y_lo, y_hi) = Self::padded_range(y_lo, y_hi);

        let mut buffer = vec![255u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(&figure.title, ("sans-serif", 26))
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(70)
                .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
                .map_err(draw_err)?;

            let date_fmt = |x: &f64| {
                x_to_date(*x)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            };
            chart
                .configure_mesh()
                .x_labels(8)
                .y_labels(8)
                .x_label_formatter(&date_fmt)
                .y_desc(figure.y_label.as_str())
                .light_line_style(RGBColor(235, 235, 235))
                .draw()
                .map_err(draw_err)?;

            for bars in &figure.bars {
                let [r, g, b] = bars.color;
                let color = RGBColor(r, g, b);
                chart
                    .draw_series(bars.points.iter().map(|p| {
                        Rectangle::new([(p[0] - 0.4, 0.0), (p[0] + 0.4, p[1])], color.filled())
                    }))
                    .map_err(draw_err)?
                    .label(bars.name.as_str())
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
            }

            for trace in figure.lines.iter().filter(|t| !t.points.is_empty()) {
                let [r, g, b] = trace.color;
                let color = RGBColor(r, g, b);
                let style = color.stroke_width(trace.width.round().max(1.0) as u32);
                let points = trace.points.iter().map(|p| (p[0], p[1]));

                let drawn = if trace.dashed {
                    chart
                        .draw_series(DashedLineSeries::new(points, 6, 4, style))
                        .map_err(draw_err)?
                } else {
                    chart
                        .draw_series(LineSeries::new(points, style))
                        .map_err(draw_err)?
                };
                drawn
                    .label(trace.name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperLeft)
                .draw()
                .map_err(draw_err)?;

            root.present().map_err(draw_err)?;
        }

        Ok(buffer)
    }

    /// Render a figure to in-memory PNG bytes.
    pub fn render_png_bytes(figure: &Figure, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let rgb = Self::render_rgb(figure, width, height)?;
        let img = RgbImage::from_raw(width, height, rgb)
            .ok_or_else(|| RenderError::Draw("pixel buffer size mismatch".to_string()))?;

        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Render a figure to a PNG file.
    pub fn render_png_file(
        figure: &Figure,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let bytes = Self::render_png_bytes(figure, width, height)?;
        std::fs::write(path, bytes)?;
        log::info!("Chart saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{macd_figure, main_figure, ChartOptions};
    use crate::data::{PriceBar, PriceSeries};
    use crate::stats::Indicators;
    use crate::view;
    use chrono::{Days, NaiveDate};

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn series(n: u64) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.2;
                PriceBar {
                    date: start.checked_add_days(Days::new(i)).unwrap(),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000_000.0 + i as f64 * 1_000.0,
                }
            })
            .collect();
        PriceSeries::from_bars("TEST", bars)
    }

    #[test]
    fn main_chart_renders_to_png() {
        let series = series(60);
        let rendered = view::render(&series);
        let indicators = Indicators::compute(&series);
        let figure = main_figure(&series, &rendered.chart, &indicators, &ChartOptions::default());

        let bytes = StaticChartRenderer::render_png_bytes(&figure, 640, 360).unwrap();
        assert!(bytes.starts_with(PNG_SIGNATURE));

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (640, 360));
    }

    #[test]
    fn macd_chart_with_bars_renders_to_file() {
        let series = series(60);
        let figure = macd_figure(&series, &Indicators::compute(&series));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("macd.png");
        StaticChartRenderer::render_png_file(&figure, &path, 480, 240).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn padded_range_widens_flat_ranges() {
        let (lo, hi) = StaticChartRenderer::padded_range(100.0, 100.0);
        assert!(lo < 100.0 && hi > 100.0);
        let (lo, hi) = StaticChartRenderer::padded_range(0.0, 0.0);
        assert_eq!((lo, hi), (-1.0, 1.0));
        let (lo, hi) = StaticChartRenderer::padded_range(10.0, 20.0);
        assert_eq!((lo, hi), (9.5, 20.5));
    }

    #[test]
    fn figure_of_only_gaps_is_rejected() {
        let figure = Figure {
            lines: vec![crate::charts::Trace {
                name: "Close".to_string(),
                points: Vec::new(),
                color: [0, 0, 0],
                width: 1.0,
                dashed: false,
            }],
            ..Default::default()
        };
        assert!(figure.is_empty());
        let err = StaticChartRenderer::render_rgb(&figure, 200, 100).unwrap_err();
        assert!(matches!(err, RenderError::EmptyFigure));
    }

    #[test]
    fn empty_figure_is_rejected() {
        let err = StaticChartRenderer::render_rgb(&Figure::default(), 200, 100).unwrap_err();
        assert!(matches!(err, RenderError::EmptyFigure));
    }
}
