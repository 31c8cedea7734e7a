/// Chart layer: side panel selections → `ChartSpec` → plot-ready data.
///
/// ```text
///   ChartConfig ──resolve──▶ ChartSpec ──build_chart──▶ ChartData
///   (raw picks)   (checks    (one variant   (groups,      (bars, lines,
///                  columns)   per kind)      bins, fits)   boxes, …)
/// ```
///
/// The 3D scatter is projected onto the plane by `view3d`.

pub mod build;
pub mod config;
pub mod view3d;

pub use build::{ChartBody, ChartData, build_chart};
pub use config::{ChartConfig, ChartError, ChartKind};
