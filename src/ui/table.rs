use eframe::egui::{Align, Layout, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::{CellValue, Dataset};
use crate::data::stats::{SummaryCell, SummaryTable};

const ROW_HEIGHT: f32 = 18.0;
const MAX_DATA_HEIGHT: f32 = 320.0;
const MAX_SUMMARY_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Raw data table
// ---------------------------------------------------------------------------

/// Render every row of `dataset` in a scrolling, virtualised table.
pub fn data_table(ui: &mut Ui, id: &str, dataset: &Dataset) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(true)
            .max_scroll_height(MAX_DATA_HEIGHT)
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(TableColumn::auto().at_least(36.0))
            .columns(
                TableColumn::auto().at_least(64.0).clip(true),
                dataset.n_columns(),
            )
            .header(ROW_HEIGHT + 4.0, |mut header| {
                header.col(|_ui: &mut Ui| {});
                for col in &dataset.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&col.name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, dataset.len(), |mut row| {
                    let i = row.index();
                    row.col(|ui: &mut Ui| {
                        ui.weak(i.to_string());
                    });
                    for col in &dataset.columns {
                        row.col(|ui: &mut Ui| match &col.values[i] {
                            CellValue::Null => {
                                ui.weak("<null>");
                            }
                            value => {
                                ui.label(value.to_string());
                            }
                        });
                    }
                });
            });
    });
    ui.weak(format!(
        "{} rows × {} columns",
        dataset.len(),
        dataset.n_columns()
    ));
}

// ---------------------------------------------------------------------------
// Describe table
// ---------------------------------------------------------------------------

/// Render a describe table: statistic labels down the left, one column per
/// dataset column.
pub fn summary_table(ui: &mut Ui, id: &str, summary: &SummaryTable) {
    if summary.columns.is_empty() {
        ui.label("No columns to summarise.");
        return;
    }
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(true)
            .max_scroll_height(MAX_SUMMARY_HEIGHT)
            .cell_layout(Layout::left_to_right(Align::Center))
            .column(TableColumn::auto().at_least(48.0))
            .columns(
                TableColumn::auto().at_least(64.0).clip(true),
                summary.columns.len(),
            )
            .header(ROW_HEIGHT + 4.0, |mut header| {
                header.col(|_ui: &mut Ui| {});
                for name in &summary.columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|mut body| {
                for stat in &summary.rows {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(RichText::new(stat.label).strong());
                        });
                        for cell in &stat.cells {
                            row.col(|ui: &mut Ui| {
                                if matches!(cell, SummaryCell::Missing) {
                                    ui.weak(cell.to_string());
                                } else {
                                    ui.label(cell.to_string());
                                }
                            });
                        }
                    });
                }
            });
    });
}
