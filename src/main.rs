mod app;
mod state;
mod ui;

use std::path::Path;

use app::DataNexusApp;
use datanexus::config::{ShellConfig, CONFIG_FILE};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ShellConfig::load(Path::new(CONFIG_FILE)).unwrap_or_else(|e| {
        log::warn!("Ignoring {CONFIG_FILE}: {e:#}");
        ShellConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size)
            .with_drag_and_drop(true),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(DataNexusApp::new(config)))),
    )
}
