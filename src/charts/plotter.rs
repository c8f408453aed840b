//! Chart Plotter Module
//! Interactive sales line chart with the event marker, using egui_plot.

use crate::charts::palette::region_color;
use crate::data::{RegionSelector, SalesTable};
use chrono::{Datelike, NaiveDate};
use egui::{Color32, RichText};
use egui_plot::{Legend, Line, LineStyle, Plot, PlotPoint, PlotPoints, Text, VLine};
use rust_decimal::prelude::ToPrimitive;

pub const X_AXIS_LABEL: &str = "Date";
pub const Y_AXIS_LABEL: &str = "Total Sales (USD)";
pub const EVENT_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

/// Days since the common era, used as the x coordinate.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Text shown next to the event marker.
pub fn event_label(event_date: NaiveDate) -> String {
    format!("Price Increase ({})", event_date.format("%b %-d, %Y"))
}

/// Title-cases a product name: "pink morsel" -> "Pink Morsel".
pub fn product_title(product: &str) -> String {
    product
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Plot-ready daily totals for one partition.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub region: String,
    pub points: Vec<[f64; 2]>,
    pub event_date: NaiveDate,
}

impl ChartData {
    pub fn from_table(
        table: &SalesTable,
        selector: &RegionSelector,
        product: &str,
        event_date: NaiveDate,
    ) -> Self {
        let points = table
            .daily_totals(selector)
            .into_iter()
            .map(|t| [date_to_x(t.date), t.sales.to_f64().unwrap_or(0.0)])
            .collect();

        Self {
            title: format!("{} Sales Over Time", product_title(product)),
            region: selector.label().to_string(),
            points,
            event_date,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_sales(&self) -> f64 {
        self.points.iter().map(|p| p[1]).fold(0.0, f64::max)
    }

    /// X range covering the data and the event date, padded when degenerate.
    pub fn x_range(&self) -> (f64, f64) {
        let event_x = date_to_x(self.event_date);
        let (min, max) = self
            .points
            .iter()
            .fold((event_x, event_x), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
        if min == max {
            (min - 1.0, max + 1.0)
        } else {
            (min, max)
        }
    }
}

/// Draws interactive charts with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn get_region_color(region: &str) -> Color32 {
        let (r, g, b) = region_color(region);
        Color32::from_rgb(r, g, b)
    }

    /// Draw the sales line, the dashed event line and its annotation.
    pub fn draw_sales_chart(ui: &mut egui::Ui, chart_data: &ChartData, height: f32) {
        if chart_data.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No data available").size(20.0));
            });
            return;
        }

        let color = Self::get_region_color(&chart_data.region);
        let event_x = date_to_x(chart_data.event_date);
        let y_max = chart_data.max_sales();

        Plot::new(format!("sales_{}", chart_data.region))
            .height(height)
            .legend(Legend::default())
            .x_axis_label(X_AXIS_LABEL)
            .y_axis_label(Y_AXIS_LABEL)
            .x_axis_formatter(|mark, _range| {
                x_to_date(mark.value)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            })
            .label_formatter(|name, value| {
                let date = x_to_date(value.x)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                if name.is_empty() {
                    format!("{date}\n${:.2}", value.y)
                } else {
                    format!("{name}\n{date}\n${:.2}", value.y)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from(chart_data.points.clone()))
                        .color(color)
                        .width(2.0)
                        .name(format!("Sales ({})", chart_data.region)),
                );

                plot_ui.vline(
                    VLine::new(event_x)
                        .color(EVENT_COLOR)
                        .width(2.0)
                        .style(LineStyle::dashed_loose())
                        .name(event_label(chart_data.event_date)),
                );

                plot_ui.text(
                    Text::new(
                        PlotPoint::new(event_x, y_max * 0.9),
                        RichText::new(event_label(chart_data.event_date))
                            .color(EVENT_COLOR)
                            .strong(),
                    )
                    .anchor(egui::Align2::LEFT_BOTTOM),
                );
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CleanRecord;
    use rust_decimal::Decimal;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, d).unwrap()
    }

    #[test]
    fn x_coordinates_round_trip_dates() {
        assert_eq!(x_to_date(date_to_x(date(15))), Some(date(15)));
        assert_eq!(event_label(date(15)), "Price Increase (Jan 15, 2021)");
    }

    #[test]
    fn title_follows_the_product() {
        assert_eq!(product_title("gummy BEAR"), "Gummy Bear");
        let data = ChartData::from_table(&SalesTable::empty(), &RegionSelector::All, "gummy bear", date(15));
        assert_eq!(data.title, "Gummy Bear Sales Over Time");
    }

    #[test]
    fn chart_data_uses_daily_totals_and_spans_event() {
        let table = SalesTable::aggregate(vec![
            CleanRecord {
                price: Decimal::new(300, 2),
                quantity: 10,
                date: date(10),
                region: "north".into(),
            },
            CleanRecord {
                price: Decimal::new(100, 2),
                quantity: 5,
                date: date(10),
                region: "south".into(),
            },
        ]);

        let data = ChartData::from_table(&table, &RegionSelector::All, "pink morsel", date(15));
        assert_eq!(data.title, "Pink Morsel Sales Over Time");
        assert_eq!(data.points, vec![[date_to_x(date(10)), 35.0]]);
        assert_eq!(data.max_sales(), 35.0);
        assert_eq!(data.x_range(), (date_to_x(date(10)), date_to_x(date(15))));

        let empty =
            ChartData::from_table(&SalesTable::empty(), &RegionSelector::All, "pink morsel", date(15));
        assert!(empty.is_empty());
        let x = date_to_x(date(15));
        assert_eq!(empty.x_range(), (x - 1.0, x + 1.0));
    }
}
