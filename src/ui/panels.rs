use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Module, StatusKind};

// ---------------------------------------------------------------------------
// Left side panel – navigation
// ---------------------------------------------------------------------------

/// Render the left navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(4.0);
    ui.heading("DataNexus");
    ui.label(RichText::new("Analytics Hub").italics().weak());
    ui.separator();

    ui.strong("Navigation Module:");
    for module in Module::ALL {
        ui.radio_value(&mut state.module, module, module.label());
    }
    ui.separator();

    match (state.session.file_name(), state.session.table()) {
        (Some(name), Some(table)) => {
            ui.label(RichText::new(name).strong());
            ui.label(format!("{} rows × {} columns", table.n_rows(), table.n_cols()));
        }
        _ => {
            ui.label("No dataset loaded.");
        }
    }
    ui.separator();
    ui.label(RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION"))).weak());
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let export = ui.add_enabled(state.session.has_data(), egui::Button::new("Export CSV…"));
            if export.clicked() {
                state.export_dialog();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(status) = &state.status {
            let color = match status.kind {
                StatusKind::Success => Color32::from_rgb(40, 160, 70),
                StatusKind::Error => Color32::RED,
            };
            ui.label(RichText::new(&status.text).color(color));
            if ui.small_button("✖").clicked() {
                state.status = None;
            }
        }
    });
}

// ---------------------------------------------------------------------------
// File input
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel workbook", &["xlsx"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

/// Load the first file dropped onto the window, if any.
pub fn accept_dropped_files(ctx: &egui::Context, state: &mut AppState) {
    let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
    let Some(file) = dropped else {
        return;
    };

    if let Some(bytes) = &file.bytes {
        state.load_bytes(&file.name, bytes);
    } else if let Some(path) = &file.path {
        state.load_path(path);
    }
}
