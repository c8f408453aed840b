//! Chart Viewer Widget
//! Header, sales chart for the selected region and the event impact table.

use crate::charts::{event_label, product_title, ChartData, ChartPlotter};
use crate::data::{Diagnostics, PipelineWarning, RegionSelector, SalesTable};
use crate::stats::{EventImpact, StatsCalculator};
use chrono::NaiveDate;
use egui::{Color32, RichText, ScrollArea};

const CHART_HEIGHT: f32 = 420.0;

/// Central panel showing the chart for the current selection.
pub struct ChartViewer {
    pub title: String,
    pub product: String,
    pub event_date: NaiveDate,
    pub chart_data: Option<ChartData>,
    pub impact: Option<EventImpact>,
}

impl ChartViewer {
    pub fn new(target_product: &str, event_date: NaiveDate) -> Self {
        Self {
            title: format!("Soul Foods {} Sales Visualiser", product_title(target_product)),
            product: target_product.to_string(),
            event_date,
            chart_data: None,
            impact: None,
        }
    }

    /// Rebuild chart data and statistics from a table snapshot.
    pub fn refresh(&mut self, table: &SalesTable, selector: &RegionSelector) {
        self.chart_data = Some(ChartData::from_table(table, selector, &self.product, self.event_date));
        self.impact = (!table.is_empty())
            .then(|| StatsCalculator::compute_event_impact(table, selector, self.event_date));
    }

    pub fn show(&self, ui: &mut egui::Ui, diagnostics: &Diagnostics) {
        ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(10.0);
                ui.label(RichText::new(&self.title).size(26.0).strong());
                ui.add_space(8.0);
                ui.label("This visualization shows the sales trend over time.");
                ui.label(format!(
                    "The red dashed line marks the {}.",
                    event_label(self.event_date)
                ));
                if let Some(text) = self.impact.as_ref().and_then(impact_sentence) {
                    ui.label(RichText::new(text).strong());
                }
            });
            ui.add_space(15.0);

            match &self.chart_data {
                Some(data) => ChartPlotter::draw_sales_chart(ui, data, CHART_HEIGHT),
                None => {
                    ui.label(RichText::new("No data available").size(20.0));
                }
            }

            ui.add_space(15.0);
            if let Some(impact) = &self.impact {
                Self::draw_impact_table(ui, impact);
                ui.add_space(10.0);
            }
            Self::draw_diagnostics(ui, diagnostics);
        });
    }

    fn draw_impact_table(ui: &mut egui::Ui, impact: &EventImpact) {
        ui.label(RichText::new("Event Impact (daily sales)").size(16.0).strong());
        ui.add_space(5.0);

        egui::Grid::new("impact_table")
            .striped(true)
            .num_columns(7)
            .spacing([20.0, 6.0])
            .show(ui, |ui| {
                for header in ["Period", "Days", "Total", "Mean", "Median", "Std", "P95"] {
                    ui.label(RichText::new(header).strong());
                }
                ui.end_row();

                for (name, stats) in [("Before", &impact.before), ("On/After", &impact.after)] {
                    ui.label(name);
                    ui.label(stats.days.to_string());
                    ui.label(format!("${}", stats.total.round_dp(2)));
                    ui.label(format_money(stats.mean));
                    ui.label(format_money(stats.median));
                    ui.label(format_money(stats.std));
                    ui.label(format_money(stats.p95));
                    ui.end_row();
                }
            });

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            if let Some(change) = impact.mean_change_pct {
                ui.label(format!("Mean change: {change:+.1}%"));
            }
            if let Some(p) = impact.p_value {
                let color = if impact.is_significant {
                    Color32::from_rgb(156, 0, 6)
                } else {
                    Color32::GRAY
                };
                ui.label(RichText::new(format!("P-value: {p:.4}")).color(color));
            }
        });
    }

    fn draw_diagnostics(ui: &mut egui::Ui, diagnostics: &Diagnostics) {
        ui.collapsing("Data quality", |ui| {
            ui.label(format!(
                "{} files, {} rows read, {} rows kept",
                diagnostics.files_loaded.len(),
                diagnostics.rows_read,
                diagnostics.rows_kept
            ));
            let drops = &diagnostics.drops;
            ui.label(format!(
                "Dropped: {} other products, {} bad prices, {} bad quantities, {} bad dates, {} overflowing sales",
                drops.product_mismatch,
                drops.invalid_price,
                drops.invalid_quantity,
                drops.invalid_date,
                drops.sales_overflow
            ));
            for warning in &diagnostics.warnings {
                ui.label(
                    RichText::new(format!("⚠ {}", describe_warning(warning)))
                        .color(Color32::from_rgb(243, 156, 18)),
                );
            }
        });
    }
}

fn format_money(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("${value:.2}")
    }
}

pub fn describe_warning(warning: &PipelineWarning) -> String {
    match warning {
        PipelineWarning::SourceSkipped { path, reason } => {
            format!("Skipped {}: {reason}", path.display())
        }
        PipelineWarning::NoSources { dir } => format!("No CSV files in {}", dir.display()),
        PipelineWarning::EmptyResult => "No sales records after filtering".to_string(),
    }
}

fn impact_sentence(impact: &EventImpact) -> Option<String> {
    let higher = impact.sales_higher_after()?;
    Some(if higher {
        "Sales were HIGHER after the price increase.".to_string()
    } else {
        "Sales were LOWER after the price increase.".to_string()
    })
}
