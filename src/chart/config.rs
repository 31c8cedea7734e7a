use std::fmt;

use thiserror::Error;

use crate::data::model::{ColumnPartition, Dataset};

// ---------------------------------------------------------------------------
// ChartKind – the chart types offered in the side panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Scatter,
    Pie,
    Box,
    Histogram,
    Scatter3d,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Scatter,
        ChartKind::Pie,
        ChartKind::Box,
        ChartKind::Histogram,
        ChartKind::Scatter3d,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Bar => "Bar Chart",
            ChartKind::Line => "Line Chart",
            ChartKind::Scatter => "Scatter Plot",
            ChartKind::Pie => "Pie Chart",
            ChartKind::Box => "Box Plot",
            ChartKind::Histogram => "Histogram",
            ChartKind::Scatter3d => "3D Scatter",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Field – a configurable chart input, named as in the side panel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    X,
    Y,
    Z,
    Color,
    PieValues,
    PieLabels,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::X => "X-Axis",
            Field::Y => "Y-Axis",
            Field::Z => "Z-Axis",
            Field::Color => "Color By",
            Field::PieValues => "Pie Chart Values",
            Field::PieLabels => "Labels",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("the dataset has no columns to chart")]
    NoColumns,
    #[error("{field} needs a numeric column, but the dataset has none")]
    NoNumericColumns { field: Field },
    #[error("{field} needs a categorical column, but the dataset has none")]
    NoCategoricalColumns { field: Field },
    #[error("{field}: column '{column}' does not exist")]
    UnknownColumn { field: Field, column: String },
    #[error("{field}: column '{column}' is not numeric")]
    NotNumeric { field: Field, column: String },
    #[error("{field}: column '{column}' is not categorical")]
    NotCategorical { field: Field, column: String },
}

// ---------------------------------------------------------------------------
// ChartConfig – raw side panel selections
// ---------------------------------------------------------------------------

/// Everything the user picked in the "Chart Options" panel. Selections
/// are column names; `resolve` checks them against the dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub x: Option<String>,
    pub y: Option<String>,
    pub color: Option<String>,
    /// Only applied to scatter plots.
    pub trendline: bool,
    /// Only shown for 3D scatter.
    pub z: Option<String>,
    pub pie_values: Option<String>,
    pub pie_names: Option<String>,
}

impl ChartConfig {
    /// First-choice selections for a freshly loaded dataset.
    pub fn defaults_for(dataset: &Dataset) -> Self {
        let partition = dataset.partition();
        let first_numeric = partition.numeric.first().cloned();
        ChartConfig {
            kind: ChartKind::default(),
            x: dataset.columns.first().map(|c| c.name.clone()),
            y: first_numeric.clone(),
            color: None,
            trendline: false,
            z: first_numeric.clone(),
            pie_values: first_numeric,
            pie_names: partition.categorical.first().cloned(),
        }
    }

    /// Validate the selections needed by the current chart kind.
    pub fn resolve(&self, dataset: &Dataset) -> Result<ChartSpec, ChartError> {
        if dataset.columns.is_empty() {
            return Err(ChartError::NoColumns);
        }
        let cols = Columns {
            dataset,
            partition: dataset.partition(),
        };
        let spec = match self.kind {
            ChartKind::Bar => ChartSpec::Bar {
                x: cols.any(Field::X, &self.x)?,
                y: cols.numeric(Field::Y, &self.y)?,
                color: cols.optional_categorical(&self.color)?,
            },
            ChartKind::Line => ChartSpec::Line {
                x: cols.any(Field::X, &self.x)?,
                y: cols.numeric(Field::Y, &self.y)?,
                color: cols.optional_categorical(&self.color)?,
            },
            ChartKind::Scatter => ChartSpec::Scatter {
                x: cols.any(Field::X, &self.x)?,
                y: cols.numeric(Field::Y, &self.y)?,
                color: cols.optional_categorical(&self.color)?,
                trendline: self.trendline,
            },
            ChartKind::Pie => ChartSpec::Pie {
                values: cols.numeric(Field::PieValues, &self.pie_values)?,
                names: cols.categorical(Field::PieLabels, &self.pie_names)?,
            },
            ChartKind::Box => {
                let y = cols.numeric(Field::Y, &self.y)?;
                let x = match cols.optional_categorical(&self.color)? {
                    Some(color) => color,
                    None => cols.any(Field::X, &self.x)?,
                };
                ChartSpec::Box { x, y }
            }
            ChartKind::Histogram => ChartSpec::Histogram {
                x: cols.any(Field::X, &self.x)?,
                color: cols.optional_categorical(&self.color)?,
            },
            ChartKind::Scatter3d => ChartSpec::Scatter3d {
                x: cols.any(Field::X, &self.x)?,
                y: cols.numeric(Field::Y, &self.y)?,
                z: cols.numeric(Field::Z, &self.z)?,
                color: cols.optional_categorical(&self.color)?,
            },
        };
        Ok(spec)
    }
}

/// Selection checks against one dataset.
struct Columns<'a> {
    dataset: &'a Dataset,
    partition: ColumnPartition,
}

impl Columns<'_> {
    fn any(&self, field: Field, selected: &Option<String>) -> Result<String, ChartError> {
        let column = selected.clone().ok_or(ChartError::NoColumns)?;
        if self.dataset.column(&column).is_none() {
            return Err(ChartError::UnknownColumn { field, column });
        }
        Ok(column)
    }

    fn numeric(&self, field: Field, selected: &Option<String>) -> Result<String, ChartError> {
        let column = selected
            .clone()
            .ok_or(ChartError::NoNumericColumns { field })?;
        let column = self.any(field, &Some(column))?;
        if !self.partition.is_numeric(&column) {
            return Err(ChartError::NotNumeric { field, column });
        }
        Ok(column)
    }

    fn categorical(&self, field: Field, selected: &Option<String>) -> Result<String, ChartError> {
        let column = selected
            .clone()
            .ok_or(ChartError::NoCategoricalColumns { field })?;
        let column = self.any(field, &Some(column))?;
        if !self.partition.is_categorical(&column) {
            return Err(ChartError::NotCategorical { field, column });
        }
        Ok(column)
    }

    fn optional_categorical(&self, selected: &Option<String>) -> Result<Option<String>, ChartError> {
        match selected {
            None => Ok(None),
            Some(_) => self.categorical(Field::Color, selected).map(Some),
        }
    }
}

// ---------------------------------------------------------------------------
// ChartSpec – a validated configuration, one variant per chart kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Bar { x: String, y: String, color: Option<String> },
    Line { x: String, y: String, color: Option<String> },
    Scatter { x: String, y: String, color: Option<String>, trendline: bool },
    Pie { values: String, names: String },
    /// `x` is the colour column when one is chosen, the x-axis otherwise.
    Box { x: String, y: String },
    Histogram { x: String, color: Option<String> },
    Scatter3d { x: String, y: String, z: String, color: Option<String> },
}
