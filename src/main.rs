//! Stock Viewer - Daily OHLCV Dashboard
//!
//! Fetches daily price data for a ticker and shows a table and interactive charts.

use eframe::egui;
use std::sync::Arc;
use stock_viewer::config::AppConfig;
use stock_viewer::data::{DataFetcher, YahooProvider};
use stock_viewer::gui::StockViewerApp;

fn main() -> eframe::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env();
    log::info!(
        "Starting with ticker {} over {} days from {}",
        config.default_ticker,
        config.lookback_days,
        config.base_url
    );

    // A broken HTTP client still opens the window; every query then reports it inline
    let fetcher = match YahooProvider::new(&config) {
        Ok(provider) => Ok(DataFetcher::new(Arc::new(provider))),
        Err(e) => {
            log::error!("Could not create market data client: {e}");
            Err(e.to_string())
        }
    };

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Stock Viewer"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Stock Viewer",
        options,
        Box::new(move |cc| Ok(Box::new(StockViewerApp::new(cc, &config, fetcher)))),
    )
}
