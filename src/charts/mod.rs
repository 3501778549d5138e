//! Charts module - Chart description and rendering

mod figure;
mod plotter;
mod renderer;

pub use figure::{
    close_trace, date_to_x, macd_figure, main_figure, multi_metric_figure, scaled_volume,
    x_to_date, BarTrace, ChartOptions, Figure, Trace, ViewType,
};
pub use plotter::ChartPlotter;
pub use renderer::{RenderError, StaticChartRenderer};
