//! Sales Visualiser - Regional Sales Pipeline & Interactive Chart Viewer

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;
use sales_visualiser::charts::{ChartData, StaticChartRenderer};
use sales_visualiser::cli::{Cli, Command};
use sales_visualiser::config::ReportConfig;
use sales_visualiser::data::export::write_sales_csv;
use sales_visualiser::data::{PipelineReport, RegionSelector, SalesPipeline};
use sales_visualiser::gui::{describe_warning, SalesApp};
use sales_visualiser::logging::init_logging;
use sales_visualiser::stats::StatsCalculator;
use std::path::Path;

const PREVIEW_ROWS: usize = 20;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let mut config = ReportConfig::load_or_default(cli.global.config.as_deref())?;
    cli.global.apply(&mut config);
    config.validate()?;

    let report = build_report(&config)?;

    match cli.command.unwrap_or(Command::View) {
        Command::View => run_viewer(config, report),
        Command::Export { output } => run_export(&report, &output),
        Command::Chart {
            output,
            region,
            width,
            height,
            open,
        } => run_chart(&config, &report, &output, &region, (width, height), open),
        Command::Summary { region, json } => run_summary(&config, &report, &region, json),
    }
}

/// Run the pipeline once; non-strict runs degrade to an empty table.
fn build_report(config: &ReportConfig) -> Result<PipelineReport> {
    match SalesPipeline::new(config.pipeline_config()).run() {
        Ok(report) => Ok(report),
        Err(e) if !config.strict => {
            tracing::error!(error = %e, "continuing with an empty table");
            Ok(PipelineReport::empty())
        }
        Err(e) => Err(e.into()),
    }
}

fn run_viewer(config: ReportConfig, report: PipelineReport) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("Soul Foods Sales Visualiser"),
        ..Default::default()
    };

    eframe::run_native(
        "Soul Foods Sales Visualiser",
        options,
        Box::new(|cc| Ok(Box::new(SalesApp::new(cc, config, report)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}

fn run_export(report: &PipelineReport, output: &Path) -> Result<()> {
    write_sales_csv(output, &report.table)?;

    println!("sales,date,region");
    for record in report.table.records().iter().take(PREVIEW_ROWS) {
        println!("{},{},{}", record.sales, record.date, record.region);
    }
    if report.table.len() > PREVIEW_ROWS {
        println!("... {} more rows", report.table.len() - PREVIEW_ROWS);
    }
    Ok(())
}

fn run_chart(
    config: &ReportConfig,
    report: &PipelineReport,
    output: &Path,
    region: &RegionSelector,
    (width, height): (u32, u32),
    open: bool,
) -> Result<()> {
    let data = ChartData::from_table(
        &report.table,
        region,
        &config.target_product,
        config.event_date,
    );
    StaticChartRenderer::render_png(&data, output, width, height)?;
    println!("Chart written to {}", output.display());

    if open {
        open::that(output).with_context(|| format!("could not open {}", output.display()))?;
    }
    Ok(())
}

fn run_summary(
    config: &ReportConfig,
    report: &PipelineReport,
    region: &RegionSelector,
    json: bool,
) -> Result<()> {
    let impact = StatsCalculator::compute_event_impact(&report.table, region, config.event_date);

    if json {
        let summary = serde_json::json!({
            "diagnostics": report.diagnostics,
            "impact": impact,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let diagnostics = &report.diagnostics;
    println!("Files loaded: {}", diagnostics.files_loaded.len());
    println!(
        "Rows read: {}  kept: {}  dropped: {}",
        diagnostics.rows_read,
        diagnostics.rows_kept,
        diagnostics.drops.total()
    );
    for warning in &diagnostics.warnings {
        println!("warning: {}", describe_warning(warning));
    }

    println!();
    println!("Region: {}  event date: {}", impact.region, impact.event_date);
    println!("Total sales: ${}", report.table.total_sales(region).round_dp(2));
    for (name, stats) in [("before", &impact.before), ("on/after", &impact.after)] {
        println!(
            "  {name:<9} days={:<4} total=${:<12} mean=${:.2} median=${:.2}",
            stats.days,
            stats.total.round_dp(2),
            stats.mean,
            stats.median
        );
    }
    if let Some(change) = impact.mean_change_pct {
        println!("Mean daily sales change: {change:+.1}%");
    }
    match impact.p_value {
        Some(p) if impact.is_significant => println!("p-value: {p:.4} (significant)"),
        Some(p) => println!("p-value: {p:.4}"),
        None => println!("p-value: n/a"),
    }
    Ok(())
}
