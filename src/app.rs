use datanexus::config::ShellConfig;
use eframe::egui;

use crate::state::{AppState, Module};
use crate::ui::{panels, views};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DataNexusApp {
    pub state: AppState,
}

impl DataNexusApp {
    pub fn new(config: ShellConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for DataNexusApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        panels::accept_dropped_files(ctx, &mut self.state);

        // ---- Top panel: menu bar + status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("nav_panel")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active module ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.module {
                    Module::Ingestion => views::ingestion(ui, &mut self.state),
                    Module::Profiling => views::profiling(ui, &self.state),
                    Module::Transformation => views::transformation(ui, &mut self.state),
                    Module::Visualization => views::visualization(ui, &mut self.state),
                });
        });
    }
}
