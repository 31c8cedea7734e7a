use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::AppState;
use crate::ui::{heatmap, panels, plot, table};

const TITLE: &str = "🏅 Sports Stats Dashboard";
const AUTHOR: &str = "Shahbaz Mehmood";
const AUTHOR_URL: &str = "https://www.linkedin.com/in/shahbaz-mehmood-data-analyst-19b32125b/";
const DESCRIPTION: &str = "This dashboard is designed to visualize and analyze sports \
statistics data. You can upload your own CSV file and explore the insights!";
const PROMPT: &str = "Please upload a sports statistics CSV file to begin.";

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.heading(title);
    ui.separator();
}

/// The scrolling main page, top to bottom.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading(RichText::new(TITLE).size(28.0).strong());
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Made by");
        ui.hyperlink_to(AUTHOR, AUTHOR_URL);
    });
    ui.label(DESCRIPTION);
    ui.add_space(8.0);

    upload_control(ui, state);

    if let Some(msg) = &state.status_message {
        ui.label(RichText::new(msg).color(Color32::RED));
    }

    if state.dataset.is_none() {
        if state.status_message.is_none() {
            ui.add_space(8.0);
            ui.label(PROMPT);
        }
        return;
    }

    if let Some(ds) = &state.dataset {
        section(ui, "📄 Raw Data");
        table::data_table(ui, "raw_data", ds);
    }

    section(ui, "📊 Summary Statistics");
    table::summary_table(ui, "summary", &state.summary);

    section(ui, "📈 Visualization");
    plot::chart_view(ui, state);

    section(ui, "🔍 Correlation Heatmap");
    heatmap::correlation_heatmap(ui, &state.correlation);

    if !state.partition.categorical.is_empty() {
        filter_section(ui, state);
    }
}

fn upload_control(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Upload your sports statistics CSV:");
        if ui.button("Browse…").clicked() {
            panels::open_file_dialog(state);
        }
        match &state.source_name {
            Some(name) => ui.weak(name),
            None => ui.weak("or drop a file onto the window"),
        };
    });
}

fn value_prompt(column: Option<&str>) -> String {
    format!("Select a {}", column.unwrap_or_default())
}

fn filter_section(ui: &mut Ui, state: &mut AppState) {
    ui.add_space(12.0);

    // Selections are applied after drawing so the combos borrow `state`
    // immutably.
    let mut column = state.filter_column.clone();
    let mut value = state.filter_value.clone();
    let values = state.filter_values();

    ui.strong("🎯 Filter Data by");
    egui::ComboBox::from_id_salt("filter_column")
        .selected_text(column.clone().unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for name in &state.partition.categorical {
                ui.selectable_value(&mut column, Some(name.clone()), name.as_str());
            }
        });

    ui.strong(value_prompt(column.as_deref()));
    egui::ComboBox::from_id_salt("filter_value")
        .selected_text(value.as_ref().map(|v| v.to_string()).unwrap_or_default())
        .show_ui(ui, |ui: &mut Ui| {
            for option in &values {
                ui.selectable_value(&mut value, Some(option.clone()), option.to_string());
            }
        });

    state.select_filter(column, value);

    if let Some(view) = &state.filter_view {
        section(ui, &format!("📌 {}", view.title()));
        table::data_table(ui, "filtered_rows", &view.rows);
        ui.add_space(6.0);
        table::summary_table(ui, "filtered_summary", &view.summary);
    }
}
