use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::chart::ChartKind;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – chart options
// ---------------------------------------------------------------------------

/// Render the "Chart Options" side panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("⚙ Chart Options");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };
    let all_columns = dataset.column_names();
    let numeric = state.partition.numeric.clone();
    let categorical = state.partition.categorical.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let cfg = &mut state.chart_config;

            ui.strong("Select Chart Type");
            egui::ComboBox::from_id_salt("chart_type")
                .selected_text(cfg.kind.label())
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for kind in ChartKind::ALL {
                        ui.selectable_value(&mut cfg.kind, kind, kind.label());
                    }
                });
            ui.add_space(6.0);

            column_picker(ui, "X-Axis", "x_axis", &mut cfg.x, &all_columns, false);
            column_picker(ui, "Y-Axis", "y_axis", &mut cfg.y, &numeric, false);
            column_picker(
                ui,
                "Color By (Optional)",
                "color_by",
                &mut cfg.color,
                &categorical,
                true,
            );
            ui.checkbox(&mut cfg.trendline, "Add Trendline (Only for Scatter)");

            if cfg.kind == ChartKind::Scatter3d {
                ui.separator();
                column_picker(ui, "Z-Axis (for 3D)", "z_axis", &mut cfg.z, &numeric, false);
                ui.add(egui::Slider::new(&mut state.view3d.yaw, -180.0..=180.0).text("Rotate"));
                ui.add(egui::Slider::new(&mut state.view3d.pitch, -90.0..=90.0).text("Tilt"));
            }

            if cfg.kind == ChartKind::Pie {
                ui.separator();
                column_picker(
                    ui,
                    "Pie Chart Values",
                    "pie_values",
                    &mut cfg.pie_values,
                    &numeric,
                    false,
                );
                column_picker(
                    ui,
                    "Labels",
                    "pie_names",
                    &mut cfg.pie_names,
                    &categorical,
                    false,
                );
            }
        });
}

/// Combo box over `options`; with `allow_none` the first entry is "None".
fn column_picker(
    ui: &mut Ui,
    label: &str,
    id: &str,
    selected: &mut Option<String>,
    options: &[String],
    allow_none: bool,
) {
    ui.strong(label);
    let text = selected.clone().unwrap_or_else(|| "None".to_string());
    egui::ComboBox::from_id_salt(id)
        .selected_text(text)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            if allow_none {
                ui.selectable_value(selected, None, "None");
            }
            for option in options {
                ui.selectable_value(selected, Some(option.clone()), option.as_str());
            }
        });
    if options.is_empty() && !allow_none {
        ui.weak("no matching columns");
    }
    ui.add_space(6.0);
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
            if ui
                .add_enabled(state.dataset.is_some(), egui::Button::new("Close"))
                .clicked()
            {
                log::info!("Closed {}", state.source_name.as_deref().unwrap_or("dataset"));
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(name)) = (&state.dataset, &state.source_name) {
            ui.label(format!(
                "{name}: {} rows, {} numeric / {} categorical columns",
                ds.len(),
                state.partition.numeric.len(),
                state.partition.categorical.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload a sports statistics CSV file")
        .add_filter("CSV", &["csv"])
        .add_filter("All supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

/// Load the first file dropped onto the window, if any.
pub fn handle_dropped_files(ctx: &egui::Context, state: &mut AppState) {
    let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
    let Some(file) = dropped else {
        return;
    };
    if let Some(path) = &file.path {
        state.load_path(path);
    } else if let Some(bytes) = &file.bytes {
        state.load_bytes(&file.name, bytes);
    }
}
