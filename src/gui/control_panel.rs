//! Control Panel Widget
//! Left side panel with the query inputs, chart options and exports.

use crate::charts::{ChartOptions, ViewType};
use crate::data::{Metric, Query, RangePreset};
use chrono::{Days, NaiveDate};
use egui::{Color32, ComboBox, RichText};
use egui_extras::DatePickerButton;

/// Left side control panel with query inputs and export controls.
pub struct ControlPanel {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub options: ChartOptions,
    pub show_raw: bool,
    pub open_after_export: bool,
    pub status: String,
    pub busy: bool,
    pub has_data: bool,
    /// File name of an imported CSV, while it is the data source.
    pub csv_source: Option<String>,
}

impl ControlPanel {
    pub fn new(ticker: &str, today: NaiveDate, lookback_days: i64) -> Self {
        let lookback = Days::new(lookback_days.max(0) as u64);
        let start = today.checked_sub_days(lookback).unwrap_or(today);

        Self {
            ticker: ticker.to_string(),
            start,
            end: today,
            options: ChartOptions::default(),
            show_raw: true,
            open_after_export: false,
            status: "Ready".to_string(),
            busy: false,
            has_data: false,
            csv_source: None,
        }
    }

    /// The query described by the current inputs.
    pub fn query(&self) -> Query {
        Query::new(&self.ticker, self.start, self.end)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📈 Stock Viewer")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Query Section =====
        ui.label(RichText::new("🔎 Query").size(14.0).strong());
        ui.add_space(5.0);

        let label_width = 80.0;

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Ticker:"));
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.ticker)
                    .desired_width(120.0)
                    .hint_text("AAPL"),
            );
            if response.lost_focus() {
                action = ControlPanelAction::QueryChanged;
            }
        });

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Start date:"));
            ui.push_id("start_date", |ui| {
                if ui.add(DatePickerButton::new(&mut self.start)).changed() {
                    action = ControlPanelAction::QueryChanged;
                }
            });
        });

        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("End date:"));
            ui.push_id("end_date", |ui| {
                if ui.add(DatePickerButton::new(&mut self.end)).changed() {
                    action = ControlPanelAction::QueryChanged;
                }
            });
        });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            for preset in RangePreset::ALL {
                if ui.small_button(preset.label()).clicked() {
                    self.start = preset.start_for(self.end);
                    action = ControlPanelAction::QueryChanged;
                }
            }
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("🔄 Refresh").clicked() {
                action = ControlPanelAction::Refresh;
            }
            if ui.button("📂 Load CSV").clicked() {
                action = ControlPanelAction::LoadCsv;
            }
        });

        if let Some(name) = &self.csv_source {
            ui.label(
                RichText::new(format!("Source: {name}"))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Chart Section =====
        ui.label(RichText::new("⚙️ Chart").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.radio_value(&mut self.options.view_type, ViewType::Single, "Single metric");
            ui.radio_value(&mut self.options.view_type, ViewType::Multi, "Multi metric");
        });

        ui.add_space(5.0);
        match self.options.view_type {
            ViewType::Single => {
                ui.horizontal(|ui| {
                    ui.add_sized([label_width, 20.0], egui::Label::new("Metric:"));
                    ComboBox::from_id_salt("metric")
                        .width(120.0)
                        .selected_text(self.options.metric.label())
                        .show_ui(ui, |ui| {
                            for metric in Metric::ALL {
                                ui.selectable_value(&mut self.options.metric, metric, metric.label());
                            }
                        });
                });
                ui.add_enabled_ui(self.options.metric == Metric::Close, |ui| {
                    ui.checkbox(&mut self.options.show_bollinger, "Bollinger bands");
                });
            }
            ViewType::Multi => {
                ui.label("Metrics:");
                ui.horizontal_wrapped(|ui| {
                    for metric in Metric::ALL {
                        let mut selected = self.options.metrics.contains(&metric);
                        if ui.checkbox(&mut selected, metric.label()).changed() {
                            if selected {
                                self.options.metrics.push(metric);
                            } else {
                                self.options.metrics.retain(|m| *m != metric);
                            }
                        }
                    }
                });
            }
        }

        ui.checkbox(&mut self.options.show_macd, "MACD chart");
        ui.checkbox(&mut self.show_raw, "Show raw data");

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.label(RichText::new("💾 Export").size(14.0).strong());
        ui.add_space(5.0);

        ui.add_enabled_ui(self.has_data && !self.busy, |ui| {
            ui.horizontal(|ui| {
                if ui.button("CSV").clicked() {
                    action = ControlPanelAction::ExportCsv;
                }
                if ui.button("PNG").clicked() {
                    action = ControlPanelAction::ExportPng;
                }
                if ui.button("📄 PPT report").clicked() {
                    action = ControlPanelAction::ExportReport;
                }
            });
        });
        ui.checkbox(&mut self.open_after_export, "Open file after export");

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.horizontal(|ui| {
            if self.busy {
                ui.spinner();
            }
            let status_color = if self.status.contains("Error") || self.status.contains("failed") {
                Color32::from_rgb(220, 53, 69)
            } else if self.status.starts_with("Loaded") || self.status.starts_with("Exported") {
                Color32::from_rgb(40, 167, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        });

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    /// One of the three inputs was submitted.
    QueryChanged,
    Refresh,
    LoadCsv,
    ExportCsv,
    ExportPng,
    ExportReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_range_uses_lookback() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let panel = ControlPanel::new("AAPL", today, 365);
        let query = panel.query();
        assert_eq!(query.ticker, "AAPL");
        assert_eq!(query.end, today);
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2023, 3, 2).unwrap());
        assert!(panel.show_raw);
    }

    #[test]
    fn query_normalizes_ticker_input() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut panel = ControlPanel::new("AAPL", today, 30);
        panel.ticker = "  msft ".to_string();
        assert_eq!(panel.query().ticker, "MSFT");
    }
}
