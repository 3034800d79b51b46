use datanexus::data::model::{Table, Value};
use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

const ROW_HEIGHT: f32 = 18.0;

/// Scrollable grid of the first `max_rows` rows of `table`.
pub fn data_preview(ui: &mut Ui, id: &str, table: &Table, max_rows: usize) {
    let n_rows = table.n_rows().min(max_rows);
    let columns = table.columns();

    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(ROW_HEIGHT * 16.0)
                .column(TableColumn::auto().at_least(32.0))
                .columns(TableColumn::auto().at_least(80.0).resizable(true), columns.len())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                    for col in columns {
                        header.col(|ui| {
                            ui.strong(&col.name)
                                .on_hover_text(format!("type: {}", col.dtype));
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, n_rows, |mut row| {
                        let r = row.index();
                        row.col(|ui| {
                            ui.label(RichText::new(r.to_string()).weak());
                        });
                        for col in columns {
                            row.col(|ui| match col.values.get(r) {
                                Some(Value::Null) | None => {
                                    ui.label(RichText::new("null").weak().italics());
                                }
                                Some(v) => {
                                    ui.label(v.to_string());
                                }
                            });
                        }
                    });
                });
        });
    });

    if table.n_rows() > n_rows {
        ui.label(RichText::new(format!("showing {n_rows} of {} rows", table.n_rows())).weak());
    }
}
