//! Stock Viewer Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{macd_figure, main_figure, ChartOptions, Figure, StaticChartRenderer};
use crate::config::AppConfig;
use crate::dashboard::{self, DashboardView, Snapshot};
use crate::data::{DataFetcher, DataLoader, DataUnavailable, FetchError, PriceSeries, Query};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::report::ReportGenerator;
use anyhow::Context;
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::thread;

const PNG_WIDTH: u32 = 1400;
const PNG_HEIGHT: u32 = 800;
const MACD_PNG_HEIGHT: u32 = 500;

/// Pipeline result from the background thread
struct Refreshed {
    query: Query,
    view: DashboardView,
    csv_name: Option<String>,
}

/// Main application window.
pub struct StockViewerApp {
    fetcher: Result<DataFetcher, String>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    view: DashboardView,
    /// Bumped whenever a new view arrives.
    generation: u64,
    /// Query behind the current or in-flight view.
    last_query: Option<Query>,
    /// Series loaded from CSV; date changes re-clip it instead of fetching.
    imported: Option<(String, PriceSeries)>,

    // Async pipeline; replacing the receiver drops any older request's result
    refresh_rx: Option<Receiver<Refreshed>>,
}

impl StockViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &AppConfig,
        fetcher: Result<DataFetcher, String>,
    ) -> Self {
        let today = chrono::Local::now().date_naive();
        let mut app = Self {
            fetcher,
            control_panel: ControlPanel::new(&config.default_ticker, today, config.lookback_days),
            chart_viewer: ChartViewer::new(),
            view: DashboardView::Empty,
            generation: 0,
            last_query: None,
            imported: None,
            refresh_rx: None,
        };

        // Initial load with the default inputs
        app.start_refresh(&cc.egui_ctx, true);
        app
    }

    /// Run the pipeline for the current inputs in a background thread.
    ///
    /// Unless forced, nothing happens when the query equals the last one run.
    fn start_refresh(&mut self, ctx: &egui::Context, force: bool) {
        let query = self.control_panel.query();
        if !force && self.last_query.as_ref() == Some(&query) {
            return;
        }
        self.last_query = Some(query.clone());

        let (tx, rx) = channel();
        self.refresh_rx = Some(rx);
        self.control_panel.busy = true;
        self.control_panel
            .set_status(format!("Loading {} {} to {}...", query.ticker, query.start, query.end));

        let fetcher = self.fetcher.clone();
        let imported = self.imported.clone();
        let ctx = ctx.clone();

        thread::spawn(move || {
            let (view, csv_name) = match (imported, fetcher) {
                (Some((name, series)), _) => {
                    let view = dashboard::from_series(&query, &name, series);
                    (view, Some(name))
                }
                (None, Ok(fetcher)) => (dashboard::refresh(&fetcher, &query), None),
                (None, Err(e)) => {
                    let err = FetchError::from(DataUnavailable::Unreachable(e));
                    (DashboardView::Unavailable(err.to_string()), None)
                }
            };
            let _ = tx.send(Refreshed {
                query,
                view,
                csv_name,
            });
            ctx.request_repaint();
        });
    }

    /// Check for pipeline results
    fn check_refresh_results(&mut self) {
        let Some(rx) = self.refresh_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(result) => {
                let status = match &result.view {
                    DashboardView::Ready(s) => format!(
                        "Loaded {} trading days for {}",
                        s.series.len(),
                        result.query.ticker
                    ),
                    DashboardView::Invalid(msg) | DashboardView::Unavailable(msg) => {
                        format!("Error: {msg}")
                    }
                    DashboardView::Empty => "Ready".to_string(),
                };
                self.control_panel.set_status(status);
                self.control_panel.has_data = result.view.snapshot().is_some();
                self.control_panel.csv_source = result.csv_name;
                self.control_panel.busy = false;
                self.view = result.view;
                self.generation += 1;
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => {
                self.refresh_rx = Some(rx);
            }
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel.busy = false;
                self.control_panel.set_status("Error: refresh worker stopped");
            }
        }
    }

    /// Handle CSV file selection
    fn handle_load_csv(&mut self, ctx: &egui::Context) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        // Exports are named TICKER_START_END.csv
        let ticker = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .and_then(|stem| stem.split('_').next().map(|t| t.trim().to_uppercase()))
            .unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        match DataLoader::load_csv(&path, &ticker) {
            Ok(series) => {
                if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
                    self.control_panel.start = first;
                    self.control_panel.end = last;
                }
                self.control_panel.ticker = ticker;
                self.imported = Some((name, series));
                self.start_refresh(ctx, true);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }

    /// Leave CSV mode when the ticker no longer matches the imported file.
    fn handle_query_changed(&mut self, ctx: &egui::Context) {
        if let Some((_, series)) = &self.imported {
            if series.ticker != self.control_panel.query().ticker {
                self.imported = None;
            }
        }
        self.start_refresh(ctx, false);
    }

    fn handle_refresh(&mut self, ctx: &egui::Context) {
        self.imported = None;
        self.start_refresh(ctx, true);
    }

    fn default_file_name(snapshot: &Snapshot, ext: &str) -> String {
        format!(
            "{}_{}_{}.{ext}",
            snapshot.series.ticker, snapshot.query.start, snapshot.query.end
        )
    }

    fn save_dialog(filter: &str, ext: &str, file_name: &str) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter(filter, &[ext])
            .set_file_name(file_name)
            .save_file()
    }

    /// Run an export and report the outcome in the status line.
    fn handle_export(&mut self, action: &ControlPanelAction) {
        let Some(snapshot) = self.view.snapshot() else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let (filter, ext) = match action {
            ControlPanelAction::ExportCsv => ("CSV Files", "csv"),
            ControlPanelAction::ExportPng => ("PNG Image", "png"),
            ControlPanelAction::ExportReport => ("PowerPoint", "pptx"),
            _ => return,
        };
        let Some(path) = Self::save_dialog(filter, ext, &Self::default_file_name(snapshot, ext)) else {
            return; // User cancelled
        };

        let options = &self.control_panel.options;
        let result = match action {
            ControlPanelAction::ExportCsv => Self::export_csv(snapshot, &path),
            ControlPanelAction::ExportPng => Self::export_png(snapshot, options, &path),
            _ => Self::export_report(snapshot, options, &path),
        };

        match result {
            Ok(()) => {
                self.control_panel
                    .set_status(format!("Exported {}", path.display()));
                if self.control_panel.open_after_export {
                    if let Err(e) = open::that(&path) {
                        log::warn!("Could not open {}: {e}", path.display());
                    }
                }
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.control_panel.set_status(format!("Export failed: {e:#}"));
            }
        }
    }

    fn export_csv(snapshot: &Snapshot, path: &Path) -> anyhow::Result<()> {
        DataLoader::write_csv(&snapshot.series, Some(&snapshot.indicators), path)
            .with_context(|| format!("writing {}", path.display()))
    }

    fn export_png(
        snapshot: &Snapshot,
        options: &ChartOptions,
        path: &Path,
    ) -> anyhow::Result<()> {
        let figure = main_figure(
            &snapshot.series,
            &snapshot.rendered.chart,
            &snapshot.indicators,
            options,
        );
        StaticChartRenderer::render_png_file(&figure, path, PNG_WIDTH, PNG_HEIGHT)
            .context("rendering chart")
    }

    fn export_report(
        snapshot: &Snapshot,
        options: &ChartOptions,
        path: &Path,
    ) -> anyhow::Result<()> {
        let render = |figure: &Figure, height: u32| match StaticChartRenderer::render_png_bytes(figure, PNG_WIDTH, height) {
            Ok(png) => Some(png),
            Err(e) => {
                log::warn!("Chart image not rendered for report: {e}");
                None
            }
        };

        let main = main_figure(
            &snapshot.series,
            &snapshot.rendered.chart,
            &snapshot.indicators,
            options,
        );
        let main_png = render(&main, PNG_HEIGHT);
        let macd_png = options
            .show_macd
            .then(|| render(&macd_figure(&snapshot.series, &snapshot.indicators), MACD_PNG_HEIGHT));

        let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let slides = ReportGenerator::slides_for(snapshot, &generated, main_png, macd_png);
        let title = format!("Stock Report - {}", snapshot.series.ticker);

        ReportGenerator::generate_file(path, &title, &slides)
            .with_context(|| format!("writing {}", path.display()))
    }
}

impl eframe::App for StockViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_refresh_results();

        // Request repaint while a request is in flight
        if self.control_panel.busy {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::QueryChanged => self.handle_query_changed(ctx),
                        ControlPanelAction::Refresh => self.handle_refresh(ctx),
                        ControlPanelAction::LoadCsv => self.handle_load_csv(ctx),
                        ControlPanelAction::ExportCsv
                        | ControlPanelAction::ExportPng
                        | ControlPanelAction::ExportReport => self.handle_export(&action),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(
                ui,
                &self.view,
                self.generation,
                &self.control_panel.options,
                self.control_panel.show_raw,
            );
        });
    }
}
