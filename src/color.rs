use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Color mapping: group label → Color32
// ---------------------------------------------------------------------------

/// Maps the colour groups of a chart to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for group labels, in legend order.
    pub fn new(labels: &[String]) -> Self {
        let palette = generate_palette(labels.len());
        let mapping: BTreeMap<String, Color32> = labels
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    /// Look up the colour for a group; ungrouped series get the default.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Sequential "Blues" scale for the correlation heatmap
// ---------------------------------------------------------------------------

/// ColorBrewer Blues, light to dark.
const BLUES: [(u8, u8, u8); 9] = [
    (247, 251, 255),
    (222, 235, 247),
    (198, 219, 239),
    (158, 202, 225),
    (107, 174, 214),
    (66, 146, 198),
    (33, 113, 181),
    (8, 81, 156),
    (8, 48, 107),
];

/// Colour at `t ∈ [0, 1]` along the Blues scale, interpolated in linear RGB.
/// NaN maps to a neutral grey.
pub fn blues(t: f64) -> Color32 {
    if t.is_nan() {
        return Color32::from_gray(200);
    }
    let scaled = t.clamp(0.0, 1.0) * (BLUES.len() - 1) as f64;
    let lo = scaled.floor() as usize;
    let hi = (lo + 1).min(BLUES.len() - 1);
    let frac = (scaled - lo as f64) as f32;

    let stop = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = stop(BLUES[lo]).mix(stop(BLUES[hi]), frac);
    to_color32(Srgb::from_linear(mixed))
}

/// Readable text colour on top of `blues(t)`.
pub fn blues_text(t: f64) -> Color32 {
    if t > 0.5 { Color32::WHITE } else { Color32::BLACK }
}
