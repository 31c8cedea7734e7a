use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Plot, PlotPoint, PlotPoints, PlotUi, Polygon, Text};

use crate::chart::build::AxisScale;
use crate::color::{blues, blues_text};
use crate::data::stats::CorrelationMatrix;

const CELL_PX: f32 = 56.0;
const MIN_HEIGHT: f32 = 220.0;
const MAX_HEIGHT: f32 = 560.0;

/// Position of `v` within `(lo, hi)`; a flat range maps everything to 1.
fn scale(v: f64, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { (v - lo) / (hi - lo) } else { 1.0 }
}

fn cell_text(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.2}")
    }
}

/// Render the correlation matrix as a labelled grid of coloured cells.
/// Row `i` sits at y = -i so the first column reads top-down.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    if matrix.is_empty() {
        ui.label("No numeric columns to correlate.");
        return;
    }
    let range = matrix.finite_range().unwrap_or((0.0, 1.0));
    let n = matrix.columns.len();
    let height = (CELL_PX * n as f32 + 80.0).clamp(MIN_HEIGHT, MAX_HEIGHT);

    ui.label(RichText::new("Feature Correlation").strong());
    ui.horizontal(|ui: &mut Ui| {
        ui.weak(format!("{:.2}", range.0));
        for i in 0..=8 {
            let (rect, _) = ui.allocate_exact_size([14.0, 10.0].into(), eframe::egui::Sense::hover());
            ui.painter().rect_filled(rect, 0.0, blues(i as f64 / 8.0));
        }
        ui.weak(format!("{:.2}", range.1));
    });

    let x_axis = AxisScale::Categorical(matrix.columns.clone());
    let y_axis = x_axis.clone();

    Plot::new("correlation_heatmap")
        .height(height)
        .data_aspect(1.0)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_grid_spacer(egui_plot::uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .y_grid_spacer(egui_plot::uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark, _range| {
            x_axis.label_at(mark.value).unwrap_or_default().to_string()
        })
        .y_axis_formatter(move |mark, _range| {
            y_axis.label_at(-mark.value).unwrap_or_default().to_string()
        })
        .show(ui, |plot_ui: &mut PlotUi| {
            for (i, row) in matrix.values.iter().enumerate() {
                for (j, &v) in row.iter().enumerate() {
                    let (x, y) = (j as f64, -(i as f64));
                    let t = if v.is_nan() { f64::NAN } else { scale(v, range) };
                    let square = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(square))
                            .fill_color(blues(t))
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                    plot_ui.text(Text::new(
                        PlotPoint::new(x, y),
                        RichText::new(cell_text(v)).color(blues_text(t)),
                    ));
                }
            }
        });
}
