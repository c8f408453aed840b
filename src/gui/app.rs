//! Sales Visualiser Main Application
//! Main window with control panel and chart viewer.

use crate::charts::{ChartData, StaticChartRenderer};
use crate::config::ReportConfig;
use crate::data::{Diagnostics, PipelineReport, SalesPipeline, SharedTable};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;

const EXPORT_WIDTH: u32 = 1400;
const EXPORT_HEIGHT: u32 = 800;

/// Pipeline result from background thread
enum LoadResult {
    Complete(PipelineReport),
    Error(String),
}

/// Main application window.
pub struct SalesApp {
    config: ReportConfig,
    table: Arc<SharedTable>,
    diagnostics: Diagnostics,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async reload
    load_rx: Option<Receiver<LoadResult>>,
}

impl SalesApp {
    /// The initial report is built by the caller before the window opens.
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ReportConfig, report: PipelineReport) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(config.data_dir.clone()),
            chart_viewer: ChartViewer::new(&config.target_product, config.event_date),
            table: Arc::new(SharedTable::default()),
            diagnostics: Diagnostics::default(),
            config,
            load_rx: None,
        };
        app.apply_report(report);
        app
    }

    /// Swap in a freshly built table and refresh every view of it.
    fn apply_report(&mut self, report: PipelineReport) {
        let PipelineReport { table, diagnostics } = report;
        let rows = table.len();
        self.table.replace(table);
        self.diagnostics = diagnostics;

        let snapshot = self.table.snapshot();
        self.control_panel.update_regions(snapshot.regions());
        self.control_panel.export_enabled = true;
        self.control_panel.set_status(&format!(
            "Loaded {} sales records from {} files",
            rows,
            self.diagnostics.files_loaded.len()
        ));
        self.refresh_chart();
    }

    fn refresh_chart(&mut self) {
        let snapshot = self.table.snapshot();
        self.chart_viewer
            .refresh(&snapshot, &self.control_panel.selected);
    }

    fn handle_browse(&mut self) {
        if let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.config.data_dir)
            .pick_folder()
        {
            self.config.data_dir = dir.clone();
            self.control_panel.data_dir = dir;
            self.start_reload();
        }
    }

    /// Rebuild the table on a background thread.
    fn start_reload(&mut self) {
        if self.load_rx.is_some() {
            return;
        }

        let pipeline = SalesPipeline::new(self.config.pipeline_config());
        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.control_panel.is_loading = true;
        self.control_panel.set_status("Reloading data...");
        tracing::info!(dir = %self.config.data_dir.display(), "reloading sales data");

        thread::spawn(move || {
            let result = match pipeline.run() {
                Ok(report) => LoadResult::Complete(report),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for reload results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete(report)) => {
                self.control_panel.is_loading = false;
                self.apply_report(report);
            }
            Ok(LoadResult::Error(error)) => {
                tracing::error!(%error, "reload failed, keeping previous table");
                self.control_panel.is_loading = false;
                self.control_panel.set_status(&format!("Error: {error}"));
            }
            Err(std::sync::mpsc::TryRecvError::Empty) => self.load_rx = Some(rx),
            Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                self.control_panel.is_loading = false;
                self.control_panel.set_status("Error: reload thread stopped");
            }
        }
    }

    fn handle_export_png(&mut self) {
        let selector = self.control_panel.selected.clone();
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name(format!("sales_{}.png", selector.label()))
            .save_file()
        else {
            return;
        };

        let snapshot = self.table.snapshot();
        let data = ChartData::from_table(
            &snapshot,
            &selector,
            &self.config.target_product,
            self.config.event_date,
        );
        match StaticChartRenderer::render_png(&data, &path, EXPORT_WIDTH, EXPORT_HEIGHT) {
            Ok(()) => {
                self.control_panel
                    .set_status(&format!("Exported {}", path.display()));
                if let Err(e) = open::that(&path) {
                    tracing::warn!(error = %e, "could not open exported chart");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "chart export failed");
                self.control_panel.set_status(&format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for SalesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.control_panel.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseDataDir => self.handle_browse(),
                        ControlPanelAction::Reload => self.start_reload(),
                        ControlPanelAction::RegionChanged => self.refresh_chart(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, &self.diagnostics);
        });
    }
}
