//! Chart Viewer Widget
//! Central scrollable panel: charts, raw data table and summary for the current view.

use crate::charts::{macd_figure, main_figure, ChartOptions, ChartPlotter, Figure};
use crate::dashboard::{DashboardView, Snapshot, PREVIEW_ROWS};
use crate::view::{table_rows, TableView};
use egui::{Color32, RichText, ScrollArea};
use egui_extras::{Column, TableBuilder};

const MAIN_CHART_HEIGHT: f32 = 420.0;
const MACD_CHART_HEIGHT: f32 = 220.0;
const TABLE_HEIGHT: f32 = 300.0;
const ROW_HEIGHT: f32 = 18.0;

/// Figures built for one view generation and one set of chart options.
struct FigureCache {
    generation: u64,
    options: ChartOptions,
    main: Figure,
    macd: Figure,
}

/// Scrollable display of the current dashboard view.
#[derive(Default)]
pub struct ChartViewer {
    cache: Option<FigureCache>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Main and MACD figures for a snapshot, rebuilt only when the view or options change.
    pub fn figures(
        &mut self,
        generation: u64,
        snapshot: &Snapshot,
        options: &ChartOptions,
    ) -> (&Figure, &Figure) {
        let stale = self
            .cache
            .as_ref()
            .map_or(true, |c| c.generation != generation || c.options != *options);

        if stale {
            self.cache = Some(FigureCache {
                generation,
                options: options.clone(),
                main: main_figure(
                    &snapshot.series,
                    &snapshot.rendered.chart,
                    &snapshot.indicators,
                    options,
                ),
                macd: macd_figure(&snapshot.series, &snapshot.indicators),
            });
        }

        let cache = self.cache.get_or_insert_with(|| FigureCache {
            generation,
            options: options.clone(),
            main: Figure::default(),
            macd: Figure::default(),
        });
        (&cache.main, &cache.macd)
    }

    /// Draw the current view. Errors replace the charts and table.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        view: &DashboardView,
        generation: u64,
        options: &ChartOptions,
        show_raw: bool,
    ) {
        let snapshot = match view {
            DashboardView::Empty => {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No Data").size(20.0));
                });
                return;
            }
            DashboardView::Invalid(msg) => {
                Self::message(ui, "⚠", msg, Color32::from_rgb(220, 53, 69));
                return;
            }
            DashboardView::Unavailable(msg) => {
                Self::message(ui, "⚠", msg, Color32::from_rgb(230, 126, 34));
                return;
            }
            DashboardView::Ready(snapshot) => snapshot,
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(
                    RichText::new(format!(
                        "{}  {} to {}  ·  {} trading days  ·  {}",
                        snapshot.series.ticker,
                        snapshot.query.start,
                        snapshot.query.end,
                        snapshot.series.len(),
                        snapshot.source
                    ))
                    .size(13.0)
                    .color(Color32::GRAY),
                );
                ui.add_space(8.0);

                let (main, macd) = self.figures(generation, snapshot, options);
                ChartPlotter::draw_figure(ui, "main_chart", main, MAIN_CHART_HEIGHT);

                if options.show_macd {
                    ui.add_space(10.0);
                    ChartPlotter::draw_figure(ui, "macd_chart", macd, MACD_CHART_HEIGHT);
                }

                if show_raw {
                    ui.add_space(15.0);
                    ui.label(RichText::new("Raw data").size(15.0).strong());
                    ui.push_id("raw_table", |ui| {
                        Self::draw_table(ui, &snapshot.rendered.table);
                    });
                }

                ui.add_space(15.0);
                egui::CollapsingHeader::new(RichText::new("Summary statistics").size(15.0).strong())
                    .default_open(false)
                    .show(ui, |ui| {
                        ChartPlotter::draw_summary_table(ui, &snapshot.summary);
                        ui.add_space(8.0);
                        ui.label(RichText::new(format!("First {PREVIEW_ROWS} rows")).strong());
                        let head = TableView {
                            headers: snapshot.rendered.table.headers.clone(),
                            rows: table_rows(snapshot.head()),
                        };
                        ui.push_id("head_table", |ui| {
                            Self::draw_table(ui, &head);
                        });
                    });
            });
    }

    fn message(ui: &mut egui::Ui, icon: &str, msg: &str, color: Color32) {
        ui.add_space(20.0);
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(2.0, color))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.label(RichText::new(format!("{icon} {msg}")).size(16.0).color(color));
            });
    }

    fn draw_table(ui: &mut egui::Ui, table: &TableView) {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(90.0), table.headers.len())
            .min_scrolled_height(0.0)
            .max_scroll_height(TABLE_HEIGHT)
            .header(20.0, |mut header| {
                for h in &table.headers {
                    header.col(|ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.rows.len(), |mut row| {
                    let cells = &table.rows[row.index()];
                    for cell in cells {
                        row.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    }
}
