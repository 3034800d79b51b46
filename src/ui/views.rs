use datanexus::data::chart::{self, ChartKind};
use datanexus::data::filter::numeric_range;
use datanexus::data::model::Table;
use datanexus::data::profile::{self, ColumnSummary, Correlation};
use datanexus::data::transform::{ImputeMethod, Transformation};
use eframe::egui::{self, Color32, RichText, Ui};

use super::{panels, plot, table};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Shared widgets
// ---------------------------------------------------------------------------

fn no_data(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.colored_label(
        Color32::from_rgb(220, 160, 0),
        "⚠ No data loaded. Please go to the Ingestion module.",
    );
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(140.0);
        ui.vertical_centered(|ui: &mut Ui| {
            ui.label(RichText::new(label).weak());
            ui.label(RichText::new(value).size(22.0).strong());
        });
    });
}

fn column_picker(ui: &mut Ui, id: &str, label: &str, names: &[String], selected: &mut Option<String>) {
    egui::ComboBox::from_id_salt(id)
        .width(180.0)
        .selected_text(selected.clone().unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for name in names {
                ui.selectable_value(selected, Some(name.clone()), name);
            }
        });
    ui.label(label);
}

// ---------------------------------------------------------------------------
// Module 1: ingestion
// ---------------------------------------------------------------------------

pub fn ingestion(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📂 Data Ingestion Interface");
    ui.label("Upload a raw dataset (.csv, .xlsx) to start. Files can also be dropped onto the window.");
    ui.add_space(6.0);
    if ui.button("Choose file…").clicked() {
        panels::open_file_dialog(state);
    }

    let Some(data) = state.session.table() else {
        return;
    };

    ui.separator();
    ui.heading("Dataset Telemetry");
    let o = profile::overview(data);
    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Total Rows", o.rows.to_string());
        metric(ui, "Total Columns", o.columns.to_string());
        metric(ui, "Missing Values", o.missing.to_string());
        metric(ui, "Duplicates", o.duplicate_rows.to_string());
    });

    ui.separator();
    ui.heading("Raw Data Preview");
    table::data_preview(ui, "raw_preview", data, state.config.preview_rows);
}

// ---------------------------------------------------------------------------
// Module 2: profiling
// ---------------------------------------------------------------------------

pub fn profiling(ui: &mut Ui, state: &AppState) {
    ui.heading("📊 Automated Data Profiling");
    let Some(data) = state.session.table() else {
        no_data(ui);
        return;
    };

    egui::CollapsingHeader::new(RichText::new("Overview").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.label(RichText::new("Statistical Summary").strong());
            summary_table(ui, &profile::summary_statistics(data));
            ui.add_space(8.0);
            ui.label(RichText::new("Column Data Type Distribution").strong());
            plot::type_pie(ui, &profile::type_distribution(data));
        });

    egui::CollapsingHeader::new(RichText::new("Missing Data Analysis").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            let counts = profile::null_counts(data);
            let missing = profile::missing_only(&counts);
            if missing.is_empty() {
                ui.colored_label(
                    Color32::from_rgb(40, 160, 70),
                    "✅ Dataset is clean. No missing values detected.",
                );
            } else {
                plot::null_counts(ui, &missing);
            }
        });

    egui::CollapsingHeader::new(RichText::new("Correlation Matrix").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| match profile::correlation_matrix(data) {
            Correlation::Matrix(matrix) => plot::correlation_heatmap(ui, &matrix),
            Correlation::InsufficientNumericColumns { found } => {
                ui.label(format!(
                    "Not enough numeric columns to generate correlation matrix ({found} found, 2 needed)."
                ));
            }
        });
}

fn summary_table(ui: &mut Ui, stats: &[ColumnSummary]) {
    if stats.is_empty() {
        ui.label("No numeric columns.");
        return;
    }
    let fmt = |v: Option<f64>| v.map_or_else(|| "NaN".to_owned(), |v| format!("{v:.4}"));

    egui::ScrollArea::horizontal()
        .id_salt("summary_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("summary_grid")
                .striped(true)
                .num_columns(stats.len() + 1)
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for s in stats {
                        ui.strong(&s.name);
                    }
                    ui.end_row();

                    let rows: [(&str, fn(&ColumnSummary) -> Option<f64>); 8] = [
                        ("mean", |s| s.mean),
                        ("std", |s| s.std),
                        ("min", |s| s.min),
                        ("25%", |s| s.q25),
                        ("50%", |s| s.median),
                        ("75%", |s| s.q75),
                        ("max", |s| s.max),
                        ("count", |s| Some(s.count as f64)),
                    ];
                    for (label, get) in rows {
                        ui.strong(label);
                        for s in stats {
                            ui.label(fmt(get(s)));
                        }
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Module 3: transformation
// ---------------------------------------------------------------------------

pub fn transformation(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🛠 ETL Transformation Engine");
    let Some(data) = state.session.table() else {
        no_data(ui);
        return;
    };
    let names = data.column_names();
    let filter_bounds = state
        .transform
        .filter_column
        .as_deref()
        .and_then(|c| numeric_range(data, c));

    // Requests are collected here and run after the widgets release `state`.
    let mut request: Option<(Transformation, &str)> = None;

    ui.columns(2, |cols| {
        if let [left, right] = cols {
            egui::Frame::group(left.style()).show(left, |ui: &mut Ui| {
                ui.heading("🗑 Drop Features");
                ui.label("Select columns to remove");
                for name in &names {
                    let mut checked = state.transform.drop.contains(name);
                    if ui.checkbox(&mut checked, name).changed() {
                        if checked {
                            state.transform.drop.insert(name.clone());
                        } else {
                            state.transform.drop.remove(name);
                        }
                    }
                }
                if ui.button("Execute Drop").clicked() {
                    request = Some((
                        Transformation::DropColumns(state.transform.drop.clone()),
                        "Columns removed successfully.",
                    ));
                }
            });

            egui::Frame::group(right.style()).show(right, |ui: &mut Ui| {
                ui.heading("🩹 Impute Missing Values");
                ui.horizontal(|ui: &mut Ui| {
                    column_picker(
                        ui,
                        "impute_column",
                        "Target column",
                        &names,
                        &mut state.transform.impute_column,
                    );
                });
                for method in ImputeMethod::ALL {
                    ui.radio_value(&mut state.transform.impute_method, method, method.label());
                }
                let ready = state.transform.impute_column.is_some();
                if ui.add_enabled(ready, egui::Button::new("Apply Transformation")).clicked() {
                    if let Some(column) = state.transform.impute_column.clone() {
                        request = Some((
                            Transformation::ImputeColumn {
                                column,
                                method: state.transform.impute_method,
                            },
                            "Transformation applied.",
                        ));
                    }
                }
            });
        }
    });

    ui.separator();
    egui::CollapsingHeader::new("🔎 Advanced Filtering").show(ui, |ui: &mut Ui| {
        let before = state.transform.filter_column.clone();
        ui.horizontal(|ui: &mut Ui| {
            column_picker(
                ui,
                "filter_column",
                "Filter by column",
                &names,
                &mut state.transform.filter_column,
            );
        });
        if state.transform.filter_column != before {
            state.reset_filter_bounds();
            return;
        }

        let Some((min, max)) = filter_bounds else {
            ui.label("Range filtering needs a numeric column with values.");
            return;
        };
        let column = state.transform.filter_column.clone().unwrap_or_default();
        ui.add(egui::Slider::new(&mut state.transform.filter_low, min..=max).text("low"));
        ui.add(egui::Slider::new(&mut state.transform.filter_high, min..=max).text("high"));
        if ui.button("Apply Filter").clicked() {
            request = Some((
                Transformation::FilterRange {
                    column,
                    low: state.transform.filter_low,
                    high: state.transform.filter_high,
                },
                "Filter applied!",
            ));
        }
    });

    if let Some((req, success)) = request {
        state.apply(&req, success);
    }

    ui.separator();
    let Some(data) = state.session.table() else {
        return;
    };
    ui.heading("✅ Processed Data Snapshot");
    table::data_preview(ui, "processed_preview", data, state.config.snapshot_rows);
    ui.add_space(6.0);
    if ui.button("⬇ Download Processed Dataset").clicked() {
        state.export_dialog();
    }
}

// ---------------------------------------------------------------------------
// Module 4: visualization
// ---------------------------------------------------------------------------

pub fn visualization(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📈 Interactive Analytics Dashboard");
    let Some(data) = state.session.table() else {
        no_data(ui);
        return;
    };
    let names = data.column_names();
    let form = &mut state.chart;

    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.heading("Chart Configuration");
        ui.horizontal_wrapped(|ui: &mut Ui| {
            egui::ComboBox::from_id_salt("chart_kind")
                .selected_text(form.kind.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for kind in ChartKind::ALL {
                        ui.selectable_value(&mut form.kind, kind, kind.label());
                    }
                });
            ui.label("Chart type");
            column_picker(ui, "chart_x", "X-axis", &names, &mut form.x);
            if form.kind.uses_y() {
                column_picker(ui, "chart_y", "Y-axis", &names, &mut form.y);
            }
            egui::ComboBox::from_id_salt("chart_color")
                .selected_text(form.color.clone().unwrap_or_else(|| "None".to_owned()))
                .show_ui(ui, |ui: &mut Ui| {
                    ui.selectable_value(&mut form.color, None, "None");
                    for name in &names {
                        ui.selectable_value(&mut form.color, Some(name.clone()), name);
                    }
                });
            ui.label("Color grouping (optional)");
        });
    });
    ui.separator();

    let (Some(x), Some(y)) = (form.x.as_deref(), form.y.as_deref()) else {
        return;
    };
    match chart::render(data, form.kind, x, y, form.color.as_deref()) {
        Ok(built) => {
            plot::chart(ui, &built);
            ui.collapsing("🔎 View Chart Data", |ui: &mut Ui| {
                let shown: Vec<&str> = if form.kind.uses_y() && x != y { vec![x, y] } else { vec![x] };
                chart_data(ui, data, &shown, state.config.chart_data_rows);
            });
        }
        Err(e) => {
            log::debug!("chart rejected: {e}");
            ui.colored_label(
                Color32::RED,
                format!("⚠ Error creating chart: {e}. Ensure Y-Axis is numeric for this chart type."),
            );
        }
    }
}

fn chart_data(ui: &mut Ui, data: &Table, columns: &[&str], rows: usize) {
    table::data_preview(ui, "chart_data_preview", &data.select(columns), rows);
}
