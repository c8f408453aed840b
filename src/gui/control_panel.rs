//! Control Panel Widget
//! Left side panel with the data source, region picker and export controls.

use crate::charts::ChartPlotter;
use crate::data::RegionSelector;
use egui::{Color32, RichText};
use std::path::PathBuf;

/// Left side control panel.
pub struct ControlPanel {
    pub data_dir: PathBuf,
    pub regions: Vec<String>,
    pub selected: RegionSelector,
    pub status: String,
    pub is_loading: bool,
    pub export_enabled: bool,
}

impl ControlPanel {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            regions: Vec::new(),
            selected: RegionSelector::All,
            status: "Ready".to_string(),
            is_loading: false,
            export_enabled: false,
        }
    }

    /// Replace the region list after a reload. Keeps the selection if the region still exists.
    pub fn update_regions(&mut self, regions: Vec<String>) {
        if let RegionSelector::Region(current) = &self.selected {
            if !regions.contains(current) {
                self.selected = RegionSelector::All;
            }
        }
        self.regions = regions;
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📈 Sales Visualiser")
                    .size(22.0)
                    .color(Color32::from_rgb(233, 30, 99)),
            );
            ui.label(RichText::new("Soul Foods").size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(self.data_dir.display().to_string()).size(12.0));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!self.is_loading, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseDataDir;
                            }
                        });
                    });
                });
            });

        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(!self.is_loading, |ui| {
                let button = egui::Button::new(RichText::new("🔄 Reload Data").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Reload;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Region Section =====
        ui.label(RichText::new("🗺 Region").size(14.0).strong());
        ui.add_space(5.0);

        let mut options = vec![RegionSelector::All];
        options.extend(self.regions.iter().cloned().map(RegionSelector::Region));

        for option in options {
            let label = option.label().to_string();
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter()
                    .rect_filled(rect, 2.0, ChartPlotter::get_region_color(&label));
                if ui.radio_value(&mut self.selected, option, label).changed() {
                    action = ControlPanelAction::RegionChanged;
                }
            });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled && !self.is_loading, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        if self.is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
        }
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseDataDir,
    Reload,
    RegionChanged,
    ExportPng,
}
