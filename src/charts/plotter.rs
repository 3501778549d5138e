//! Chart Plotter Module
//! Draws figures and summary tables interactively using egui_plot.

use crate::charts::{x_to_date, Figure};
use crate::stats::ColumnSummary;
use crate::view::{format_price, format_volume};
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoints};

/// Draws figures with a date x-axis.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color(rgb: [u8; 3]) -> Color32 {
        Color32::from_rgb(rgb[0], rgb[1], rgb[2])
    }

    fn date_label(x: f64) -> String {
        x_to_date(x)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    /// Draw a figure as an interactive plot.
    pub fn draw_figure(ui: &mut egui::Ui, id: &str, figure: &Figure, height: f32) {
        ui.label(RichText::new(&figure.title).size(15.0).strong());

        Plot::new(id)
            .height(height)
            .legend(Legend::default())
            .allow_scroll(false)
            .y_axis_label(figure.y_label.clone())
            .x_axis_formatter(|mark, _range| Self::date_label(mark.value))
            .label_formatter(|name, value| {
                let date = Self::date_label(value.x);
                if name.is_empty() {
                    format!("{date}\n{:.2}", value.y)
                } else {
                    format!("{name}\n{date}\n{:.2}", value.y)
                }
            })
            .show(ui, |plot_ui| {
                for bars in &figure.bars {
                    let color = Self::color(bars.color);
                    let elems: Vec<Bar> = bars
                        .points
                        .iter()
                        .map(|p| Bar::new(p[0], p[1]).width(0.8).fill(color))
                        .collect();
                    plot_ui.bar_chart(BarChart::new(elems).color(color).name(&bars.name));
                }

                for trace in &figure.lines {
                    if trace.points.is_empty() {
                        continue;
                    }
                    let mut line = Line::new(PlotPoints::new(trace.points.clone()))
                        .color(Self::color(trace.color))
                        .width(trace.width)
                        .name(&trace.name);
                    if trace.dashed {
                        line = line.style(LineStyle::dashed_dense());
                    }
                    plot_ui.line(line);
                }
            });
    }

    /// Draw the per-column describe table.
    pub fn draw_summary_table(ui: &mut egui::Ui, summary: &[ColumnSummary]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id("summary_table"))
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("").size(11.0));
                        for s in summary {
                            ui.label(RichText::new(s.metric.label()).strong().size(11.0));
                        }
                        ui.end_row();

                        let rows: [(&str, fn(&ColumnSummary) -> f64); 8] = [
                            ("count", |s| s.count as f64),
                            ("mean", |s| s.mean),
                            ("std", |s| s.std),
                            ("min", |s| s.min),
                            ("25%", |s| s.p25),
                            ("50%", |s| s.median),
                            ("75%", |s| s.p75),
                            ("max", |s| s.max),
                        ];

                        for (label, get) in rows {
                            ui.label(RichText::new(label).strong().size(11.0));
                            for s in summary {
                                let value = get(s);
                                let text = if label == "count" {
                                    format_volume(value)
                                } else {
                                    format_price(value)
                                };
                                ui.label(RichText::new(text).size(11.0));
                            }
                            ui.end_row();
                        }

                        ui.label(RichText::new("missing").strong().size(11.0));
                        for s in summary {
                            let color = if s.missing > 0 {
                                Color32::from_rgb(220, 53, 69)
                            } else {
                                ui.visuals().text_color()
                            };
                            ui.label(RichText::new(s.missing.to_string()).size(11.0).color(color));
                        }
                        ui.end_row();
                    });
            });
    }
}
