use std::collections::HashMap;

use super::config::ChartSpec;
use crate::data::model::{CellValue, Column, Dataset};
use crate::data::stats::quantile;

/// Number of equal-width bins for numeric histograms.
pub const HISTOGRAM_BINS: usize = 30;

/// Marker radius range (pixels) for `size = y`.
const MIN_RADIUS: f32 = 1.5;
const RADIUS_SPAN: f32 = 8.5;

/// Relative bar width for categorical axes and single-valued numeric axes.
const BAR_FILL: f64 = 0.8;

// ---------------------------------------------------------------------------
// Chart data types
// ---------------------------------------------------------------------------

/// How x values map onto the horizontal axis.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisScale {
    Numeric,
    /// Categories placed at 0, 1, 2, … in order of first appearance.
    Categorical(Vec<String>),
}

impl AxisScale {
    /// Tick label for a categorical axis; `None` between categories.
    pub fn label_at(&self, position: f64) -> Option<&str> {
        match self {
            AxisScale::Numeric => None,
            AxisScale::Categorical(labels) => {
                let rounded = position.round();
                if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
                    return None;
                }
                labels.get(rounded as usize).map(String::as_str)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    /// Marker radius per point, parallel to `points`.
    pub radii: Vec<f32>,
}

/// Ordinary least squares fit `y = intercept + slope * x` over `x_range`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub name: String,
    pub intercept: f64,
    pub slope: f64,
    pub x_range: (f64, f64),
}

impl TrendLine {
    pub fn endpoints(&self) -> [[f64; 2]; 2] {
        let (lo, hi) = self.x_range;
        [
            [lo, self.intercept + self.slope * lo],
            [hi, self.intercept + self.slope * hi],
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSegment {
    pub x: f64,
    /// Where the segment starts; non-zero when stacked on another group.
    pub base: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarGroup {
    pub name: String,
    pub segments: Vec<BarSegment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub label: String,
    pub position: f64,
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    /// Quartiles plus whiskers at the furthest points within 1.5 IQR.
    fn from_values(label: String, position: f64, values: &mut [f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let q1 = quantile(values, 0.25);
        let median = quantile(values, 0.5);
        let q3 = quantile(values, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside: Vec<f64> = values
            .iter()
            .copied()
            .filter(|v| (lo_fence..=hi_fence).contains(v))
            .collect();
        let outliers = values
            .iter()
            .copied()
            .filter(|v| !(lo_fence..=hi_fence).contains(v))
            .collect();

        Some(BoxSummary {
            label,
            position,
            lower_whisker: inside.first().copied().unwrap_or(q1),
            q1,
            median,
            q3,
            upper_whisker: inside.last().copied().unwrap_or(q3),
            outliers,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series3d {
    pub name: String,
    pub points: Vec<Point3>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartBody {
    Bars { groups: Vec<BarGroup>, bar_width: f64 },
    Lines(Vec<Series>),
    Scatter { series: Vec<ScatterSeries>, trends: Vec<TrendLine> },
    Pie(Vec<PieSlice>),
    Boxes(Vec<BoxSummary>),
    Histogram { groups: Vec<BarGroup>, bin_width: f64 },
    Scatter3d { z_label: String, series: Vec<Series3d> },
}

/// Everything the plot widget needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: Option<&'static str>,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: AxisScale,
    /// Colour group names in legend order; empty when ungrouped.
    pub groups: Vec<String>,
    pub body: ChartBody,
}

// ---------------------------------------------------------------------------
// Building
// ---------------------------------------------------------------------------

/// Build plot-ready data for a validated `ChartSpec`.
///
/// Columns named by `spec` must exist in `dataset` (`ChartConfig::resolve`
/// guarantees it); a missing column yields an empty chart.
pub fn build_chart(dataset: &Dataset, spec: &ChartSpec) -> ChartData {
    match spec {
        ChartSpec::Bar { x, y, color } => build_bar(dataset, x, y, color.as_deref()),
        ChartSpec::Line { x, y, color } => build_line(dataset, x, y, color.as_deref()),
        ChartSpec::Scatter {
            x,
            y,
            color,
            trendline,
        } => build_scatter(dataset, x, y, color.as_deref(), *trendline),
        ChartSpec::Pie { values, names } => build_pie(dataset, values, names),
        ChartSpec::Box { x, y } => build_box(dataset, x, y),
        ChartSpec::Histogram { x, color } => build_histogram(dataset, x, color.as_deref()),
        ChartSpec::Scatter3d { x, y, z, color } => {
            build_scatter3d(dataset, x, y, z, color.as_deref())
        }
    }
}

fn column_or_empty(dataset: &Dataset, name: &str) -> Column {
    dataset.column(name).cloned().unwrap_or_else(|| Column {
        name: name.to_string(),
        kind: crate::data::model::ColumnKind::Categorical,
        values: vec![CellValue::Null; dataset.len()],
    })
}

/// Position of every row on the x-axis (`None` for nulls).
fn x_positions(column: &Column) -> (AxisScale, Vec<Option<f64>>) {
    if column.is_numeric() {
        let positions = column
            .values
            .iter()
            .map(|v| v.as_f64().filter(|f| !f.is_nan()))
            .collect();
        return (AxisScale::Numeric, positions);
    }
    let (labels, positions) = category_positions(column);
    (AxisScale::Categorical(labels), positions)
}

/// Distinct display labels in first-appearance order, and each row's index.
fn category_positions(column: &Column) -> (Vec<String>, Vec<Option<f64>>) {
    let mut labels: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let positions = column
        .values
        .iter()
        .map(|v| {
            if v.is_null() {
                return None;
            }
            let label = v.to_string();
            let next = labels.len();
            let i = *index.entry(label.clone()).or_insert_with(|| {
                labels.push(label);
                next
            });
            Some(i as f64)
        })
        .collect();
    (labels, positions)
}

/// Row indices per colour group. Ungrouped charts get one unnamed group;
/// rows with a null colour are dropped.
fn group_rows(dataset: &Dataset, color: Option<&str>) -> Vec<(String, Vec<usize>)> {
    let Some(color) = color else {
        return vec![(String::new(), (0..dataset.len()).collect())];
    };
    let column = column_or_empty(dataset, color);
    let (labels, positions) = category_positions(&column);
    let mut groups: Vec<(String, Vec<usize>)> =
        labels.into_iter().map(|l| (l, Vec::new())).collect();
    for (row, pos) in positions.into_iter().enumerate() {
        if let Some(p) = pos {
            groups[p as usize].1.push(row);
        }
    }
    groups
}

fn group_names(groups: &[(String, Vec<usize>)], color: Option<&str>) -> Vec<String> {
    if color.is_none() {
        return Vec::new();
    }
    groups.iter().map(|(name, _)| name.clone()).collect()
}

fn number_at(column: &Column, row: usize) -> Option<f64> {
    column.values[row].as_f64().filter(|v| !v.is_nan())
}

/// Area-proportional marker radius for a size value.
pub fn marker_radius(value: f64, max: f64) -> f32 {
    if max.is_nan() || max <= 0.0 || !value.is_finite() {
        return MIN_RADIUS;
    }
    let share = (value.max(0.0) / max).clamp(0.0, 1.0);
    MIN_RADIUS + RADIUS_SPAN * share.sqrt() as f32
}

/// Stack segments of successive groups at the same x: positive heights
/// grow upwards, negative ones downwards.
fn stack(groups: Vec<(String, Vec<(f64, f64)>)>) -> Vec<BarGroup> {
    let mut tops: HashMap<u64, (f64, f64)> = HashMap::new();
    groups
        .into_iter()
        .map(|(name, bars)| {
            let segments = bars
                .into_iter()
                .map(|(x, height)| {
                    let (pos, neg) = tops.entry(x.to_bits()).or_insert((0.0, 0.0));
                    let base = if height >= 0.0 { *pos } else { *neg };
                    if height >= 0.0 {
                        *pos += height;
                    } else {
                        *neg += height;
                    }
                    BarSegment { x, base, height }
                })
                .collect();
            BarGroup { name, segments }
        })
        .collect()
}

/// Sum `value` per x position, keeping first-appearance order.
fn sum_by_position(items: impl Iterator<Item = (f64, f64)>) -> Vec<(f64, f64)> {
    let mut order: Vec<(f64, f64)> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();
    for (x, v) in items {
        match index.get(&x.to_bits()) {
            Some(&i) => order[i].1 += v,
            None => {
                index.insert(x.to_bits(), order.len());
                order.push((x, v));
            }
        }
    }
    order
}

/// Bar width from the smallest gap between distinct numeric x positions.
fn bar_width(scale: &AxisScale, positions: &[Option<f64>]) -> f64 {
    if matches!(scale, AxisScale::Categorical(_)) {
        return BAR_FILL;
    }
    let mut xs: Vec<f64> = positions.iter().flatten().copied().collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    xs.windows(2)
        .map(|w| w[1] - w[0])
        .fold(None, |acc: Option<f64>, gap| Some(acc.map_or(gap, |a| a.min(gap))))
        .map_or(BAR_FILL, |gap| gap * BAR_FILL)
}

fn build_bar(dataset: &Dataset, x: &str, y: &str, color: Option<&str>) -> ChartData {
    let x_col = column_or_empty(dataset, x);
    let y_col = column_or_empty(dataset, y);
    let (x_axis, positions) = x_positions(&x_col);
    let groups = group_rows(dataset, color);

    let sums = groups
        .iter()
        .map(|(name, rows)| {
            let items = rows
                .iter()
                .filter_map(|&r| Some((positions[r]?, number_at(&y_col, r)?)));
            (name.clone(), sum_by_position(items))
        })
        .collect();

    ChartData {
        title: None,
        x_label: x.to_string(),
        y_label: y.to_string(),
        groups: group_names(&groups, color),
        body: ChartBody::Bars {
            groups: stack(sums),
            bar_width: bar_width(&x_axis, &positions),
        },
        x_axis,
    }
}

fn build_line(dataset: &Dataset, x: &str, y: &str, color: Option<&str>) -> ChartData {
    let x_col = column_or_empty(dataset, x);
    let y_col = column_or_empty(dataset, y);
    let (x_axis, positions) = x_positions(&x_col);
    let groups = group_rows(dataset, color);

    let series = groups
        .iter()
        .map(|(name, rows)| Series {
            name: if name.is_empty() { y.to_string() } else { name.clone() },
            points: rows
                .iter()
                .filter_map(|&r| Some([positions[r]?, number_at(&y_col, r)?]))
                .collect(),
        })
        .collect();

    ChartData {
        title: None,
        x_label: x.to_string(),
        y_label: y.to_string(),
        x_axis,
        groups: group_names(&groups, color),
        body: ChartBody::Lines(series),
    }
}

/// OLS intercept and slope; `None` without two distinct x values.
pub fn ols_fit(points: &[[f64; 2]]) -> Option<(f64, f64)> {
    let n = points.len() as f64;
    if points.len() < 2 {
        return None;
    }
    let mx = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let my = points.iter().map(|p| p[1]).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|p| (p[0] - mx).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = points.iter().map(|p| (p[0] - mx) * (p[1] - my)).sum();
    let slope = sxy / sxx;
    Some((my - slope * mx, slope))
}

fn build_scatter(
    dataset: &Dataset,
    x: &str,
    y: &str,
    color: Option<&str>,
    trendline: bool,
) -> ChartData {
    let x_col = column_or_empty(dataset, x);
    let y_col = column_or_empty(dataset, y);
    let (x_axis, positions) = x_positions(&x_col);
    let groups = group_rows(dataset, color);
    let max_size = y_col.numbers().into_iter().fold(0.0_f64, f64::max);

    let series: Vec<ScatterSeries> = groups
        .iter()
        .map(|(name, rows)| {
            let points: Vec<[f64; 2]> = rows
                .iter()
                .filter_map(|&r| Some([positions[r]?, number_at(&y_col, r)?]))
                .collect();
            let radii = points.iter().map(|p| marker_radius(p[1], max_size)).collect();
            ScatterSeries {
                name: if name.is_empty() { y.to_string() } else { name.clone() },
                points,
                radii,
            }
        })
        .collect();

    // A trend line over category indices would be meaningless.
    let trends = if trendline && x_axis == AxisScale::Numeric {
        series
            .iter()
            .filter_map(|s| {
                let (intercept, slope) = ols_fit(&s.points)?;
                let lo = s.points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
                let hi = s.points.iter().map(|p| p[0]).fold(f64::NEG_INFINITY, f64::max);
                Some(TrendLine {
                    name: s.name.clone(),
                    intercept,
                    slope,
                    x_range: (lo, hi),
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    ChartData {
        title: None,
        x_label: x.to_string(),
        y_label: y.to_string(),
        x_axis,
        groups: group_names(&groups, color),
        body: ChartBody::Scatter { series, trends },
    }
}

fn build_pie(dataset: &Dataset, values: &str, names: &str) -> ChartData {
    let value_col = column_or_empty(dataset, values);
    let name_col = column_or_empty(dataset, names);
    let (labels, positions) = category_positions(&name_col);

    let mut totals = vec![0.0; labels.len()];
    for (row, pos) in positions.into_iter().enumerate() {
        if let (Some(p), Some(v)) = (pos, number_at(&value_col, row)) {
            totals[p as usize] += v;
        }
    }
    let kept: Vec<(String, f64)> = labels
        .into_iter()
        .zip(totals)
        .filter(|(_, total)| *total > 0.0)
        .collect();
    let sum: f64 = kept.iter().map(|(_, v)| v).sum();
    let slices = kept
        .into_iter()
        .map(|(label, value)| PieSlice {
            label,
            value,
            fraction: value / sum,
        })
        .collect();

    ChartData {
        title: Some("Pie Chart"),
        x_label: names.to_string(),
        y_label: values.to_string(),
        x_axis: AxisScale::Numeric,
        groups: Vec::new(),
        body: ChartBody::Pie(slices),
    }
}

fn build_box(dataset: &Dataset, x: &str, y: &str) -> ChartData {
    let x_col = column_or_empty(dataset, x);
    let y_col = column_or_empty(dataset, y);
    let (labels, positions) = category_positions(&x_col);

    let mut values: Vec<Vec<f64>> = vec![Vec::new(); labels.len()];
    for (row, pos) in positions.into_iter().enumerate() {
        if let (Some(p), Some(v)) = (pos, number_at(&y_col, row)) {
            values[p as usize].push(v);
        }
    }
    let boxes = labels
        .iter()
        .zip(values.iter_mut())
        .enumerate()
        .filter_map(|(i, (label, vals))| BoxSummary::from_values(label.clone(), i as f64, vals))
        .collect();

    ChartData {
        title: Some("Box Plot"),
        x_label: x.to_string(),
        y_label: y.to_string(),
        x_axis: AxisScale::Categorical(labels),
        groups: Vec::new(),
        body: ChartBody::Boxes(boxes),
    }
}

/// Equal-width bin index for `value` in `[lo, lo + width * bins]`.
fn bin_index(value: f64, lo: f64, width: f64) -> usize {
    (((value - lo) / width).floor().max(0.0) as usize).min(HISTOGRAM_BINS - 1)
}

fn build_histogram(dataset: &Dataset, x: &str, color: Option<&str>) -> ChartData {
    let x_col = column_or_empty(dataset, x);
    let (x_axis, positions) = x_positions(&x_col);
    let groups = group_rows(dataset, color);

    let (counts, bin_width): (Vec<(String, Vec<(f64, f64)>)>, f64) = match &x_axis {
        AxisScale::Numeric => {
            // Infinite values have no bin.
            let xs: Vec<f64> = positions
                .iter()
                .flatten()
                .copied()
                .filter(|x| x.is_finite())
                .collect();
            let mut lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
            let mut hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if !lo.is_finite() || !hi.is_finite() {
                (lo, hi) = (0.0, 1.0);
            }
            if lo == hi {
                (lo, hi) = (lo - 0.5, hi + 0.5);
            }
            let width = (hi - lo) / HISTOGRAM_BINS as f64;
            let counts = groups
                .iter()
                .map(|(name, rows)| {
                    let mut bins = vec![0usize; HISTOGRAM_BINS];
                    for x in rows
                        .iter()
                        .filter_map(|&r| positions[r])
                        .filter(|x| x.is_finite())
                    {
                        bins[bin_index(x, lo, width)] += 1;
                    }
                    let bars = bins
                        .into_iter()
                        .enumerate()
                        .filter(|(_, n)| *n > 0)
                        .map(|(i, n)| (lo + width * (i as f64 + 0.5), n as f64))
                        .collect();
                    (name.clone(), bars)
                })
                .collect();
            (counts, width)
        }
        AxisScale::Categorical(_) => {
            let counts = groups
                .iter()
                .map(|(name, rows)| {
                    let items = rows.iter().filter_map(|&r| Some((positions[r]?, 1.0)));
                    (name.clone(), sum_by_position(items))
                })
                .collect();
            (counts, BAR_FILL)
        }
    };

    ChartData {
        title: Some("Histogram"),
        x_label: x.to_string(),
        y_label: "count".to_string(),
        groups: group_names(&groups, color),
        body: ChartBody::Histogram {
            groups: stack(counts),
            bin_width,
        },
        x_axis,
    }
}

fn build_scatter3d(
    dataset: &Dataset,
    x: &str,
    y: &str,
    z: &str,
    color: Option<&str>,
) -> ChartData {
    let x_col = column_or_empty(dataset, x);
    let y_col = column_or_empty(dataset, y);
    let z_col = column_or_empty(dataset, z);
    let (x_axis, positions) = x_positions(&x_col);
    let groups = group_rows(dataset, color);
    let max_size = y_col.numbers().into_iter().fold(0.0_f64, f64::max);

    let series = groups
        .iter()
        .map(|(name, rows)| Series3d {
            name: if name.is_empty() { y.to_string() } else { name.clone() },
            points: rows
                .iter()
                .filter_map(|&r| {
                    let yv = number_at(&y_col, r)?;
                    Some(Point3 {
                        x: positions[r]?,
                        y: yv,
                        z: number_at(&z_col, r)?,
                        radius: marker_radius(yv, max_size),
                    })
                })
                .collect(),
        })
        .collect();

    ChartData {
        title: Some("3D Scatter Plot"),
        x_label: x.to_string(),
        y_label: y.to_string(),
        x_axis,
        groups: group_names(&groups, color),
        body: ChartBody::Scatter3d {
            z_label: z.to_string(),
            series,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;
    use anyhow::{Result, bail};

    fn players() -> Result<Dataset> {
        load_csv_reader(
            "player,team,games,points\n\
             A,X,1,10\n\
             B,Y,2,20\n\
             C,X,3,30\n\
             D,Y,4,40\n\
             E,X,5,\n"
                .as_bytes(),
        )
    }

    #[test]
    fn bars_sum_per_category_and_stack_groups() -> Result<()> {
        let ds = load_csv_reader("team,pos,pts\nX,G,1\nX,F,2\nY,G,3\nX,G,4".as_bytes())?;
        let chart = build_chart(
            &ds,
            &ChartSpec::Bar { x: "team".into(), y: "pts".into(), color: Some("pos".into()) },
        );
        assert_eq!(chart.x_axis, AxisScale::Categorical(vec!["X".into(), "Y".into()]));
        assert_eq!(chart.groups, vec!["G", "F"]);
        let ChartBody::Bars { groups, bar_width } = chart.body else {
            bail!("expected bars");
        };
        assert_eq!(bar_width, 0.8);
        assert_eq!(
            groups[0].segments,
            vec![
                BarSegment { x: 0.0, base: 0.0, height: 5.0 },
                BarSegment { x: 1.0, base: 0.0, height: 3.0 },
            ]
        );
        // F stacks on top of G's team X bar
        assert_eq!(groups[1].segments, vec![BarSegment { x: 0.0, base: 5.0, height: 2.0 }]);
        Ok(())
    }

    #[test]
    fn numeric_bar_width_follows_smallest_gap() -> Result<()> {
        let ds = players()?;
        let chart = build_chart(
            &ds,
            &ChartSpec::Bar { x: "games".into(), y: "points".into(), color: None },
        );
        let ChartBody::Bars { bar_width, groups } = chart.body else {
            bail!("expected bars");
        };
        assert!((bar_width - 0.8).abs() < 1e-12);
        assert_eq!(groups[0].segments.len(), 4);
        Ok(())
    }

    #[test]
    fn lines_skip_null_values_and_keep_row_order() -> Result<()> {
        let ds = players()?;
        let chart = build_chart(
            &ds,
            &ChartSpec::Line { x: "games".into(), y: "points".into(), color: Some("team".into()) },
        );
        let ChartBody::Lines(series) = chart.body else {
            bail!("expected lines");
        };
        assert_eq!(series[0].name, "X");
        assert_eq!(series[0].points, vec![[1.0, 10.0], [3.0, 30.0]]);
        assert_eq!(series[1].points, vec![[2.0, 20.0], [4.0, 40.0]]);
        Ok(())
    }

    #[test]
    fn scatter_sizes_and_trend() -> Result<()> {
        let ds = players()?;
        let chart = build_chart(
            &ds,
            &ChartSpec::Scatter {
                x: "games".into(),
                y: "points".into(),
                color: None,
                trendline: true,
            },
        );
        let ChartBody::Scatter { series, trends } = chart.body else {
            bail!("expected scatter");
        };
        assert_eq!(series[0].radii.len(), series[0].points.len());
        assert_eq!(series[0].radii[3], MIN_RADIUS + RADIUS_SPAN);
        assert!(series[0].radii[0] < series[0].radii[3]);
        assert_eq!(trends.len(), 1);
        assert!((trends[0].slope - 10.0).abs() < 1e-9);
        assert!(trends[0].intercept.abs() < 1e-9);
        assert_eq!(trends[0].x_range, (1.0, 4.0));
        Ok(())
    }

    #[test]
    fn trend_needs_numeric_x() -> Result<()> {
        let ds = players()?;
        let chart = build_chart(
            &ds,
            &ChartSpec::Scatter {
                x: "player".into(),
                y: "points".into(),
                color: None,
                trendline: true,
            },
        );
        let ChartBody::Scatter { trends, .. } = chart.body else {
            bail!("expected scatter");
        };
        assert!(trends.is_empty());
        Ok(())
    }

    #[test]
    fn ols_rejects_degenerate_input() {
        assert_eq!(ols_fit(&[[1.0, 2.0]]), None);
        assert_eq!(ols_fit(&[[1.0, 2.0], [1.0, 3.0]]), None);
        assert_eq!(ols_fit(&[[0.0, 1.0], [2.0, 5.0]]), Some((1.0, 2.0)));
    }

    #[test]
    fn pie_sums_values_per_label() -> Result<()> {
        let ds = players()?;
        let chart = build_chart(
            &ds,
            &ChartSpec::Pie { values: "points".into(), names: "team".into() },
        );
        let ChartBody::Pie(slices) = chart.body else {
            bail!("expected pie");
        };
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].label, "X");
        assert_eq!(slices[0].value, 40.0);
        assert_eq!(slices[1].value, 60.0);
        assert!((slices.iter().map(|s| s.fraction).sum::<f64>() - 1.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn pie_drops_non_positive_totals() -> Result<()> {
        let ds = load_csv_reader("k,v\na,0\nb,-3\nc,2".as_bytes())?;
        let chart = build_chart(&ds, &ChartSpec::Pie { values: "v".into(), names: "k".into() });
        let ChartBody::Pie(slices) = chart.body else {
            bail!("expected pie");
        };
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].fraction, 1.0);
        Ok(())
    }

    #[test]
    fn box_whiskers_exclude_outliers() -> Result<()> {
        let ds = load_csv_reader("g,v\na,1\na,2\na,3\na,4\na,100\nb,5".as_bytes())?;
        let chart = build_chart(&ds, &ChartSpec::Box { x: "g".into(), y: "v".into() });
        let ChartBody::Boxes(boxes) = chart.body else {
            bail!("expected boxes");
        };
        assert_eq!(boxes.len(), 2);
        let a = &boxes[0];
        assert_eq!((a.q1, a.median, a.q3), (2.0, 3.0, 4.0));
        assert_eq!(a.lower_whisker, 1.0);
        assert_eq!(a.upper_whisker, 4.0);
        assert_eq!(a.outliers, vec![100.0]);
        assert_eq!(boxes[1].position, 1.0);
        assert_eq!(boxes[1].median, 5.0);
        Ok(())
    }

    #[test]
    fn histogram_uses_thirty_bins() -> Result<()> {
        let csv: String = std::iter::once("v".to_string())
            .chain((0..=300).map(|i| i.to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        let ds = load_csv_reader(csv.as_bytes())?;
        let chart = build_chart(&ds, &ChartSpec::Histogram { x: "v".into(), color: None });
        let ChartBody::Histogram { groups, bin_width } = chart.body else {
            bail!("expected histogram");
        };
        assert_eq!(bin_width, 10.0);
        assert_eq!(groups[0].segments.len(), HISTOGRAM_BINS);
        let total: f64 = groups[0].segments.iter().map(|s| s.height).sum();
        assert_eq!(total, 301.0);
        // the maximum lands in the last bin
        assert_eq!(groups[0].segments[HISTOGRAM_BINS - 1].height, 11.0);
        Ok(())
    }

    #[test]
    fn histogram_of_constant_column() -> Result<()> {
        let ds = load_csv_reader("v\n7\n7".as_bytes())?;
        let chart = build_chart(&ds, &ChartSpec::Histogram { x: "v".into(), color: None });
        let ChartBody::Histogram { groups, .. } = chart.body else {
            bail!("expected histogram");
        };
        assert_eq!(groups[0].segments.len(), 1);
        assert_eq!(groups[0].segments[0].height, 2.0);
        Ok(())
    }

    #[test]
    fn histogram_ignores_infinite_values() -> Result<()> {
        let ds = load_csv_reader("v\n1\n2\n3\n4\ninf\n-inf".as_bytes())?;
        let chart = build_chart(&ds, &ChartSpec::Histogram { x: "v".into(), color: None });
        let ChartBody::Histogram { groups, bin_width } = chart.body else {
            bail!("expected histogram");
        };
        assert!((bin_width - 0.1).abs() < 1e-12);
        assert_eq!(groups[0].segments.len(), 4);
        assert!(groups[0].segments.iter().all(|s| s.height == 1.0));
        let first = groups[0].segments[0].x;
        assert!((first - 1.05).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn categorical_histogram_counts_per_group() -> Result<()> {
        let ds = players()?;
        let chart = build_chart(
            &ds,
            &ChartSpec::Histogram { x: "team".into(), color: Some("team".into()) },
        );
        let ChartBody::Histogram { groups, .. } = chart.body else {
            bail!("expected histogram");
        };
        assert_eq!(groups[0].segments, vec![BarSegment { x: 0.0, base: 0.0, height: 3.0 }]);
        assert_eq!(groups[1].segments, vec![BarSegment { x: 1.0, base: 0.0, height: 2.0 }]);
        Ok(())
    }

    #[test]
    fn scatter3d_requires_all_coordinates() -> Result<()> {
        let ds = players()?;
        let chart = build_chart(
            &ds,
            &ChartSpec::Scatter3d {
                x: "player".into(),
                y: "points".into(),
                z: "games".into(),
                color: None,
            },
        );
        let ChartBody::Scatter3d { series, z_label } = chart.body else {
            bail!("expected 3d scatter");
        };
        assert_eq!(z_label, "games");
        // E has no points
        assert_eq!(series[0].points.len(), 4);
        assert_eq!(series[0].points[1].x, 1.0);
        Ok(())
    }

    #[test]
    fn categorical_axis_labels() {
        let axis = AxisScale::Categorical(vec!["X".into(), "Y".into()]);
        assert_eq!(axis.label_at(1.0), Some("Y"));
        assert_eq!(axis.label_at(0.5), None);
        assert_eq!(axis.label_at(-1.0), None);
        assert_eq!(AxisScale::Numeric.label_at(0.0), None);
    }

    #[test]
    fn marker_radius_is_bounded() {
        assert_eq!(marker_radius(-5.0, 10.0), MIN_RADIUS);
        assert_eq!(marker_radius(10.0, 10.0), MIN_RADIUS + RADIUS_SPAN);
        assert_eq!(marker_radius(3.0, 0.0), MIN_RADIUS);
    }
}
