use eframe::egui;

use crate::state::AppState;
use crate::ui::{page, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct DashboardApp {
    pub state: AppState,
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        panels::handle_dropped_files(ctx, &mut self.state);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: chart options ----
        if self.state.dataset.is_some() {
            egui::SidePanel::left("chart_options")
                .default_width(240.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::side_panel(ui, &mut self.state);
                });
        }

        self.state.sync_chart();

        // ---- Central panel: dashboard page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    page::dashboard(ui, &mut self.state);
                });
        });
    }
}
