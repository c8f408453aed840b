//! Static Chart Renderer
//! Writes the sales line chart to a PNG file with plotters.
//!
//! Layout:
//! 1. Title centered on top
//! 2. Line of daily sales for the selected region
//! 3. Dashed vertical line at the event date with its annotation
//!
//! An empty partition renders a placeholder image instead of failing.

use crate::charts::palette::region_color;
use crate::charts::plotter::{
    date_to_x, event_label, x_to_date, ChartData, X_AXIS_LABEL, Y_AXIS_LABEL,
};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use thiserror::Error;

const EVENT_RGB: RGBColor = RGBColor(220, 53, 69);
const DASH_COUNT: usize = 24;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart {}: {message}", path.display())]
    Draw { path: PathBuf, message: String },
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render `data` to a PNG at `path`.
    pub fn render_png(
        data: &ChartData,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let draw_err = |e: &dyn std::fmt::Display| RenderError::Draw {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| draw_err(&e))?;

        if data.is_empty() {
            Self::draw_placeholder(&root, width, height).map_err(|e| draw_err(&e))?;
        } else {
            Self::draw_chart(&root, data).map_err(|e| draw_err(&e))?;
        }

        root.present().map_err(|e| draw_err(&e))?;
        tracing::info!(path = %path.display(), region = %data.region, "rendered chart");
        Ok(())
    }

    fn draw_placeholder<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        width: u32,
        height: u32,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let style = ("sans-serif", 32)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw(&Text::new(
            "No data available",
            ((width / 2) as i32, (height / 2) as i32),
            style,
        ))
    }

    fn draw_chart<DB: DrawingBackend>(
        root: &DrawingArea<DB, plotters::coord::Shift>,
        data: &ChartData,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let (x_min, x_max) = data.x_range();
        let y_max = data.max_sales();
        let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

        let (r, g, b) = region_color(&data.region);
        let line_color = RGBColor(r, g, b);

        let title = format!("{} ({})", data.title, data.region);
        let mut chart = ChartBuilder::on(root)
            .caption(title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(x_min..x_max, 0f64..y_top)?;

        chart
            .configure_mesh()
            .x_desc(X_AXIS_LABEL)
            .y_desc(Y_AXIS_LABEL)
            .x_labels(8)
            .x_label_formatter(&|x| {
                x_to_date(*x)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            })
            .y_label_formatter(&|y| format!("{y:.0}"))
            .draw()?;

        chart
            .draw_series(LineSeries::new(
                data.points.iter().map(|p| (p[0], p[1])),
                line_color.stroke_width(2),
            ))?
            .label(format!("Sales ({})", data.region))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_color));

        // Dashed marker: every other segment of the vertical line
        let event_x = date_to_x(data.event_date);
        let step = y_top / (DASH_COUNT * 2) as f64;
        chart
            .draw_series((0..DASH_COUNT).map(|i| {
                let y0 = step * (2 * i) as f64;
                PathElement::new(vec![(event_x, y0), (event_x, y0 + step)], EVENT_RGB.stroke_width(2))
            }))?
            .label(event_label(data.event_date))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], EVENT_RGB));

        chart.draw_series(std::iter::once(Text::new(
            event_label(data.event_date),
            (event_x, y_max * 0.9),
            ("sans-serif", 18).into_font().color(&EVENT_RGB),
        )))?;

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .position(SeriesLabelPosition::UpperLeft)
            .draw()?;

        Ok(())
    }
}
