//! Charts module - Chart rendering

pub mod palette;
mod plotter;
mod renderer;

pub use plotter::{date_to_x, event_label, product_title, x_to_date, ChartData, ChartPlotter};
pub use renderer::{RenderError, StaticChartRenderer};
