use std::collections::HashMap;
use std::fmt;

use super::model::{CellValue, Column, ColumnKind, Dataset};

// ---------------------------------------------------------------------------
// Scalar helpers
// ---------------------------------------------------------------------------

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1); NaN below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Quantile of an ascending slice with linear interpolation between ranks.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Pearson correlation of paired samples; NaN when undefined.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return f64::NAN;
    }
    let mx = mean(&xs[..n]);
    let my = mean(&ys[..n]);
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

// ---------------------------------------------------------------------------
// Per-column summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl NumericSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let s = sorted(values);
        NumericSummary {
            count: s.len(),
            mean: mean(&s),
            std: sample_std(&s),
            min: s.first().copied().unwrap_or(f64::NAN),
            q1: quantile(&s, 0.25),
            median: quantile(&s, 0.5),
            q3: quantile(&s, 0.75),
            max: s.last().copied().unwrap_or(f64::NAN),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    /// Most frequent value; ties go to the value seen first.
    pub top: Option<String>,
    pub freq: usize,
}

impl CategoricalSummary {
    pub fn from_column(column: &Column) -> Self {
        let mut order: Vec<&CellValue> = Vec::new();
        let mut counts: HashMap<&CellValue, usize> = HashMap::new();
        for value in column.values.iter().filter(|v| !v.is_null()) {
            let n = counts.entry(value).or_insert(0);
            if *n == 0 {
                order.push(value);
            }
            *n += 1;
        }
        let mut top: Option<(&CellValue, usize)> = None;
        for &value in &order {
            let n = counts[value];
            if top.map_or(true, |(_, best)| n > best) {
                top = Some((value, n));
            }
        }
        CategoricalSummary {
            count: counts.values().sum(),
            unique: order.len(),
            top: top.map(|(v, _)| v.to_string()),
            freq: top.map_or(0, |(_, n)| n),
        }
    }
}

// ---------------------------------------------------------------------------
// Describe table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryCell {
    Count(usize),
    Number(f64),
    Text(String),
    /// Statistic does not apply to the column's kind.
    Missing,
}

impl fmt::Display for SummaryCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryCell::Count(n) => write!(f, "{n}"),
            SummaryCell::Number(v) if v.is_nan() => write!(f, "NaN"),
            SummaryCell::Number(v) => write!(f, "{v:.4}"),
            SummaryCell::Text(s) => write!(f, "{s}"),
            SummaryCell::Missing => write!(f, "NaN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: &'static str,
    pub cells: Vec<SummaryCell>,
}

/// Descriptive statistics for every column: one row per statistic,
/// one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn row(&self, label: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    pub fn cell(&self, label: &str, column: &str) -> Option<&SummaryCell> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.row(label)?.cells.get(idx)
    }
}

const CATEGORICAL_ROWS: [&str; 3] = ["unique", "top", "freq"];
const NUMERIC_ROWS: [&str; 7] = ["mean", "std", "min", "25%", "50%", "75%", "max"];

enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

impl ColumnSummary {
    fn cell(&self, label: &str) -> SummaryCell {
        match self {
            ColumnSummary::Numeric(s) => match label {
                "count" => SummaryCell::Count(s.count),
                "mean" => SummaryCell::Number(s.mean),
                "std" => SummaryCell::Number(s.std),
                "min" => SummaryCell::Number(s.min),
                "25%" => SummaryCell::Number(s.q1),
                "50%" => SummaryCell::Number(s.median),
                "75%" => SummaryCell::Number(s.q3),
                "max" => SummaryCell::Number(s.max),
                _ => SummaryCell::Missing,
            },
            ColumnSummary::Categorical(s) => match label {
                "count" => SummaryCell::Count(s.count),
                "unique" => SummaryCell::Count(s.unique),
                "top" => s
                    .top
                    .clone()
                    .map_or(SummaryCell::Missing, SummaryCell::Text),
                "freq" if s.top.is_some() => SummaryCell::Count(s.freq),
                _ => SummaryCell::Missing,
            },
        }
    }
}

/// Summary statistics over all columns, numeric and categorical alike.
///
/// Rows present: `count`, then `unique/top/freq` if any column is
/// categorical, then `mean/std/min/25%/50%/75%/max` if any is numeric.
pub fn describe(dataset: &Dataset) -> SummaryTable {
    if dataset.columns.is_empty() {
        return SummaryTable::default();
    }
    let summaries: Vec<ColumnSummary> = dataset
        .columns
        .iter()
        .map(|col| match col.kind {
            ColumnKind::Numeric => ColumnSummary::Numeric(NumericSummary::from_values(&col.numbers())),
            ColumnKind::Categorical => {
                ColumnSummary::Categorical(CategoricalSummary::from_column(col))
            }
        })
        .collect();

    let has_categorical = dataset.columns.iter().any(|c| !c.is_numeric());
    let has_numeric = dataset.columns.iter().any(Column::is_numeric);

    let mut labels: Vec<&'static str> = vec!["count"];
    if has_categorical {
        labels.extend(CATEGORICAL_ROWS);
    }
    if has_numeric {
        labels.extend(NUMERIC_ROWS);
    }

    let rows = labels
        .into_iter()
        .map(|label| SummaryRow {
            label,
            cells: summaries.iter().map(|s| s.cell(label)).collect(),
        })
        .collect();

    SummaryTable {
        columns: dataset.column_names(),
        rows,
    }
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    /// Numeric column names, in file order.
    pub columns: Vec<String>,
    /// Square, symmetric matrix of Pearson coefficients.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Finite (min, max) over all cells, used to scale the heatmap colours.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .flatten()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// Pairwise-complete Pearson correlation over all numeric columns.
pub fn correlation(dataset: &Dataset) -> CorrelationMatrix {
    let numeric: Vec<&Column> = dataset.columns.iter().filter(|c| c.is_numeric()).collect();
    let n = numeric.len();
    let mut values = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        for j in i..n {
            let (xs, ys) = paired_values(numeric[i], numeric[j]);
            let mut r = pearson(&xs, &ys);
            if i == j && r.is_finite() {
                r = 1.0;
            }
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: numeric.iter().map(|c| c.name.clone()).collect(),
        values,
    }
}

/// Rows where both columns hold a number.
fn paired_values(a: &Column, b: &Column) -> (Vec<f64>, Vec<f64>) {
    a.values
        .iter()
        .zip(&b.values)
        .filter_map(|(x, y)| Some((x.as_f64()?, y.as_f64()?)))
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;
    use anyhow::{Context, Result};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let s = [1.0, 2.0, 3.0, 4.0];
        assert!(close(quantile(&s, 0.25), 1.75));
        assert!(close(quantile(&s, 0.5), 2.5));
        assert!(close(quantile(&s, 1.0), 4.0));
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn std_needs_two_values() {
        assert!(sample_std(&[5.0]).is_nan());
        assert!(close(sample_std(&[10.0, 20.0, 30.0]), 10.0));
    }

    #[test]
    fn describe_mixed_table() -> Result<()> {
        let ds = load_csv_reader("name,score,team\nA,10,X\nB,20,Y\nC,30,X".as_bytes())?;
        let table = describe(&ds);
        assert_eq!(table.columns, vec!["name", "score", "team"]);
        let labels: Vec<&str> = table.rows.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec!["count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
        assert!(table.rows.iter().all(|r| r.cells.len() == 3));

        assert_eq!(table.cell("count", "score"), Some(&SummaryCell::Count(3)));
        assert_eq!(table.cell("mean", "score"), Some(&SummaryCell::Number(20.0)));
        assert_eq!(table.cell("25%", "score"), Some(&SummaryCell::Number(15.0)));
        assert_eq!(table.cell("unique", "score"), Some(&SummaryCell::Missing));

        assert_eq!(table.cell("top", "team"), Some(&SummaryCell::Text("X".into())));
        assert_eq!(table.cell("freq", "team"), Some(&SummaryCell::Count(2)));
        assert_eq!(table.cell("unique", "name"), Some(&SummaryCell::Count(3)));
        assert_eq!(table.cell("mean", "team"), Some(&SummaryCell::Missing));
        Ok(())
    }

    #[test]
    fn describe_numeric_only_has_eight_rows() -> Result<()> {
        let ds = load_csv_reader("a,b\n1,2\n3,4".as_bytes())?;
        let table = describe(&ds);
        assert_eq!(table.rows.len(), 8);
        assert!(table.row("top").is_none());
        Ok(())
    }

    #[test]
    fn describe_categorical_only_has_four_rows() -> Result<()> {
        let ds = load_csv_reader("team\nX\nY\nY".as_bytes())?;
        let table = describe(&ds);
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.cell("top", "team"), Some(&SummaryCell::Text("Y".into())));
        Ok(())
    }

    #[test]
    fn top_ties_go_to_first_seen() -> Result<()> {
        let ds = load_csv_reader("team\nY\nX\nX\nY".as_bytes())?;
        let table = describe(&ds);
        assert_eq!(table.cell("top", "team"), Some(&SummaryCell::Text("Y".into())));
        Ok(())
    }

    #[test]
    fn nulls_are_not_counted() -> Result<()> {
        let ds = load_csv_reader("v,t\n1,\n,a\n3,a".as_bytes())?;
        let table = describe(&ds);
        assert_eq!(table.cell("count", "v"), Some(&SummaryCell::Count(2)));
        assert_eq!(table.cell("count", "t"), Some(&SummaryCell::Count(2)));
        assert_eq!(table.cell("unique", "t"), Some(&SummaryCell::Count(1)));
        Ok(())
    }

    #[test]
    fn correlation_signs_and_symmetry() -> Result<()> {
        let ds = load_csv_reader("x,y,z,team\n1,2,9,A\n2,4,7,B\n3,6,5,A\n4,8,2,B".as_bytes())?;
        let corr = correlation(&ds);
        assert_eq!(corr.columns, vec!["x", "y", "z"]);
        assert!(close(corr.values[0][0], 1.0));
        assert!(close(corr.values[0][1], 1.0));
        assert!(corr.values[0][2] < -0.9);
        assert!(close(corr.values[0][2], corr.values[2][0]));
        Ok(())
    }

    #[test]
    fn constant_column_correlates_as_nan() -> Result<()> {
        let ds = load_csv_reader("x,c\n1,5\n2,5\n3,5".as_bytes())?;
        let corr = correlation(&ds);
        let c = corr.columns.iter().position(|n| n == "c").context("c")?;
        assert!(corr.values[c][c].is_nan());
        assert!(corr.values[0][c].is_nan());
        assert_eq!(corr.finite_range(), Some((1.0, 1.0)));
        Ok(())
    }

    #[test]
    fn correlation_uses_pairwise_complete_rows() -> Result<()> {
        let ds = load_csv_reader("x,y\n1,1\n2,\n3,3\n4,4".as_bytes())?;
        let corr = correlation(&ds);
        assert!(close(corr.values[0][1], 1.0));
        Ok(())
    }

    #[test]
    fn no_numeric_columns_gives_empty_matrix() -> Result<()> {
        let ds = load_csv_reader("team\nX".as_bytes())?;
        assert!(correlation(&ds).is_empty());
        Ok(())
    }
}
