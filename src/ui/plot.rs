use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, LineStyle, Plot, PlotPoint,
    PlotPoints, PlotUi, Points, Polygon, Text,
};

use crate::chart::build::{AxisScale, BarGroup, BoxSummary, PieSlice, Series3d};
use crate::chart::view3d::{Bounds, ViewAngles, axis_segments, project};
use crate::chart::{ChartBody, ChartData};
use crate::color::{ColorMap, generate_palette};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 420.0;

/// Points along each pie slice's outer arc.
const ARC_STEPS_PER_TURN: f64 = 180.0;

// ---------------------------------------------------------------------------
// Chart (central panel, "Visualization" section)
// ---------------------------------------------------------------------------

/// Render the configured chart, or the reason it cannot be drawn.
pub fn chart_view(ui: &mut Ui, state: &AppState) {
    let chart = match &state.chart {
        Some(Ok(chart)) => chart,
        Some(Err(e)) => {
            ui.label(
                RichText::new(format!("Cannot draw {}: {e}", state.chart_config.kind))
                    .color(Color32::from_rgb(220, 140, 0)),
            );
            return;
        }
        None => return,
    };

    if let Some(title) = chart.title {
        ui.label(RichText::new(title).strong());
    }

    let colors = state.color_map.clone().unwrap_or_else(|| ColorMap::new(&[]));

    match &chart.body {
        ChartBody::Pie(slices) => pie_plot(ui, slices),
        ChartBody::Scatter3d { z_label, series } => {
            scatter3d_plot(ui, chart, z_label, series, &colors, state.view3d)
        }
        _ => cartesian_plot(ui, chart, &colors),
    }
}

/// Plot with axis titles and, for categorical x, category tick labels.
fn base_plot(id: &str, chart: &ChartData) -> Plot<'static> {
    let mut plot = Plot::new(id.to_owned())
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label(chart.x_label.clone())
        .y_axis_label(chart.y_label.clone())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if let AxisScale::Categorical(_) = &chart.x_axis {
        let axis = chart.x_axis.clone();
        plot = plot
            .x_grid_spacer(egui_plot::uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
            .x_axis_formatter(move |mark, _range| {
                axis.label_at(mark.value).unwrap_or_default().to_string()
            });
    }
    plot
}

fn cartesian_plot(ui: &mut Ui, chart: &ChartData, colors: &ColorMap) {
    base_plot("chart_plot", chart).show(ui, |plot_ui: &mut PlotUi| match &chart.body {
        ChartBody::Bars { groups, bar_width } => {
            bar_groups(plot_ui, groups, *bar_width, &chart.y_label, colors)
        }
        ChartBody::Histogram { groups, bin_width } => {
            bar_groups(plot_ui, groups, *bin_width, "count", colors)
        }
        ChartBody::Lines(series) => {
            for s in series {
                let line = Line::new(PlotPoints::from(s.points.clone()))
                    .name(&s.name)
                    .color(colors.color_for(&s.name))
                    .width(1.5);
                plot_ui.line(line);
            }
        }
        ChartBody::Scatter { series, trends } => {
            for s in series {
                let color = colors.color_for(&s.name);
                let sized = s.points.iter().copied().zip(s.radii.iter().copied());
                for (radius, points) in radius_buckets(sized) {
                    plot_ui.points(
                        Points::new(points)
                            .name(&s.name)
                            .color(color)
                            .radius(radius)
                            .filled(true),
                    );
                }
            }
            for t in trends {
                plot_ui.line(
                    Line::new(PlotPoints::from(t.endpoints().to_vec()))
                        .name(format!("{} trend", t.name))
                        .color(colors.color_for(&t.name))
                        .style(LineStyle::dashed_loose())
                        .width(2.0),
                );
            }
        }
        ChartBody::Boxes(boxes) => box_plot(plot_ui, boxes, &chart.y_label),
        ChartBody::Pie(_) | ChartBody::Scatter3d { .. } => {}
    });
}

fn bar_groups(
    plot_ui: &mut PlotUi,
    groups: &[BarGroup],
    width: f64,
    fallback_name: &str,
    colors: &ColorMap,
) {
    for group in groups {
        let name = if group.name.is_empty() {
            fallback_name
        } else {
            group.name.as_str()
        };
        let bars = group
            .segments
            .iter()
            .map(|s| {
                Bar::new(s.x, s.height)
                    .base_offset(s.base)
                    .width(width)
                    .name(name)
            })
            .collect();
        plot_ui.bar_chart(
            BarChart::new(bars)
                .name(name)
                .color(colors.color_for(&group.name)),
        );
    }
}

fn box_plot(plot_ui: &mut PlotUi, boxes: &[BoxSummary], name: &str) {
    let color = Color32::LIGHT_BLUE;
    let elems = boxes
        .iter()
        .map(|b| {
            BoxElem::new(
                b.position,
                BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
            )
            .name(&b.label)
            .box_width(0.5)
        })
        .collect();
    plot_ui.box_plot(BoxPlot::new(elems).name(name).color(color));

    let outliers: Vec<[f64; 2]> = boxes
        .iter()
        .flat_map(|b| b.outliers.iter().map(move |&v| [b.position, v]))
        .collect();
    if !outliers.is_empty() {
        plot_ui.points(Points::new(outliers).name(name).color(color).radius(2.5));
    }
}

/// Marker radii are rounded to this step so a series needs only a few
/// `Points` items.
const RADIUS_STEP: f32 = 0.5;

/// Group sized points into one list per rounded radius, largest first so
/// small markers stay visible. Input order is kept within a bucket.
fn radius_buckets(
    points: impl IntoIterator<Item = ([f64; 2], f32)>,
) -> Vec<(f32, Vec<[f64; 2]>)> {
    let mut buckets: BTreeMap<u32, Vec<[f64; 2]>> = BTreeMap::new();
    for (point, radius) in points {
        let step = (radius.max(0.0) / RADIUS_STEP).round() as u32;
        buckets.entry(step).or_default().push(point);
    }
    buckets
        .into_iter()
        .rev()
        .map(|(step, points)| (step as f32 * RADIUS_STEP, points))
        .collect()
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

/// Outline of a slice starting at `start` (radians) spanning `sweep`
/// clockwise.
fn slice_outline(start: f64, sweep: f64) -> Vec<[f64; 2]> {
    let steps = ((sweep / TAU) * ARC_STEPS_PER_TURN).ceil().max(2.0) as usize;
    let mut points = vec![[0.0, 0.0]];
    points.extend((0..=steps).map(|i| {
        let angle = start - sweep * i as f64 / steps as f64;
        [angle.cos(), angle.sin()]
    }));
    points
}

/// A slice cut into wedges of at most a quarter turn; polygons are only
/// filled correctly when convex.
fn slice_wedges(start: f64, sweep: f64) -> Vec<Vec<[f64; 2]>> {
    let pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let step = sweep / pieces as f64;
    (0..pieces)
        .map(|i| slice_outline(start - step * i as f64, step))
        .collect()
}

fn pie_plot(ui: &mut Ui, slices: &[PieSlice]) {
    if slices.is_empty() {
        ui.label("Nothing to draw: every label sums to zero or less.");
        return;
    }
    let palette = generate_palette(slices.len());
    Plot::new("pie_plot")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui: &mut PlotUi| {
            // Clockwise from twelve o'clock.
            let mut start = FRAC_PI_2;
            for (slice, color) in slices.iter().zip(&palette) {
                let sweep = slice.fraction * TAU;
                for wedge in slice_wedges(start, sweep) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(wedge))
                            .name(&slice.label)
                            .fill_color(*color)
                            .stroke(Stroke::new(1.0, *color)),
                    );
                }
                let mid = start - sweep / 2.0;
                plot_ui.text(Text::new(
                    PlotPoint::new(0.65 * mid.cos(), 0.65 * mid.sin()),
                    RichText::new(format!("{:.1}%", slice.fraction * 100.0))
                        .color(Color32::WHITE)
                        .strong(),
                ));
                start -= sweep;
            }
        });
}

// ---------------------------------------------------------------------------
// 3D scatter
// ---------------------------------------------------------------------------

fn scatter3d_plot(
    ui: &mut Ui,
    chart: &ChartData,
    z_label: &str,
    series: &[Series3d],
    colors: &ColorMap,
    view: ViewAngles,
) {
    let bounds = Bounds::of(series.iter().flat_map(|s| &s.points));

    // Far points first so near ones are drawn on top within a marker item.
    let mut projected: Vec<(f64, [f64; 2], f32, &str)> = series
        .iter()
        .flat_map(|s| {
            s.points.iter().map(move |p| {
                let proj = project(bounds.normalize(p), view);
                (proj.depth, proj.screen, p.radius, s.name.as_str())
            })
        })
        .collect();
    projected.sort_by(|a, b| b.0.total_cmp(&a.0));

    let axis_names = [chart.x_label.as_str(), chart.y_label.as_str(), z_label];

    Plot::new("scatter3d_plot")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui: &mut PlotUi| {
            for (segment, name) in axis_segments(view).iter().zip(axis_names) {
                plot_ui.line(
                    Line::new(PlotPoints::from(segment.to_vec()))
                        .color(Color32::GRAY)
                        .width(1.0),
                );
                let [x, y] = segment[1];
                plot_ui.text(Text::new(PlotPoint::new(x, y), RichText::new(name).weak()));
            }
            for s in series {
                let sized = projected
                    .iter()
                    .filter(|(_, _, _, name)| *name == s.name)
                    .map(|(_, screen, radius, _)| (*screen, *radius));
                for (radius, points) in radius_buckets(sized) {
                    plot_ui.points(
                        Points::new(points)
                            .name(&s.name)
                            .color(colors.color_for(&s.name))
                            .radius(radius)
                            .filled(true),
                    );
                }
            }
        });
}
