use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes a CSV reader infers.
/// Filter options and colour groups key on `CellValue`, so it must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in ordered collections --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Parse a non-null CSV token into the narrowest matching type.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }
        match trimmed {
            "true" | "True" | "TRUE" => CellValue::Bool(true),
            "false" | "False" | "FALSE" => CellValue::Bool(false),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    /// Numeric view of the value; `None` for nulls and non-numeric cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Column – one named field with an inferred kind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// What the non-null cells of a column have in common.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inferred {
    Empty,
    Integer,
    Float,
    Bool,
    Text,
}

fn infer(cells: &[CellValue]) -> Inferred {
    let mut inferred = Inferred::Empty;
    for cell in cells {
        let this = match cell {
            CellValue::Null => continue,
            CellValue::Integer(_) => Inferred::Integer,
            CellValue::Float(_) => Inferred::Float,
            CellValue::Bool(_) => Inferred::Bool,
            CellValue::Text(_) => return Inferred::Text,
        };
        inferred = match (inferred, this) {
            (Inferred::Empty, t) => t,
            (a, b) if a == b => a,
            (Inferred::Integer, Inferred::Float) | (Inferred::Float, Inferred::Integer) => {
                Inferred::Float
            }
            _ => return Inferred::Text,
        };
    }
    inferred
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    /// Build a column from raw text cells (`None` = null token).
    ///
    /// Categorical columns keep the original text of every non-null cell,
    /// so `"007"` next to `"abc"` stays `"007"`.
    pub fn from_raw(name: impl Into<String>, raw: Vec<Option<String>>) -> Self {
        let parsed: Vec<CellValue> = raw
            .iter()
            .map(|c| c.as_deref().map_or(CellValue::Null, CellValue::parse))
            .collect();
        match infer(&parsed) {
            Inferred::Text => {
                let values = raw
                    .into_iter()
                    .map(|c| c.map_or(CellValue::Null, CellValue::Text))
                    .collect();
                Column {
                    name: name.into(),
                    kind: ColumnKind::Categorical,
                    values,
                }
            }
            _ => Self::from_cells(name, parsed),
        }
    }

    /// Build a column from already-typed cells (JSON / Parquet sources).
    pub fn from_cells(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        let (kind, values) = match infer(&cells) {
            // A header-only file yields object columns, a file with rows
            // but no values yields all-NaN float columns.
            Inferred::Empty if cells.is_empty() => (ColumnKind::Categorical, cells),
            Inferred::Empty | Inferred::Integer => (ColumnKind::Numeric, cells),
            Inferred::Float => {
                let promoted = cells
                    .into_iter()
                    .map(|c| match c {
                        CellValue::Integer(i) => CellValue::Float(i as f64),
                        other => other,
                    })
                    .collect();
                (ColumnKind::Numeric, promoted)
            }
            Inferred::Bool => (ColumnKind::Categorical, cells),
            Inferred::Text => {
                let texts = cells
                    .into_iter()
                    .map(|c| match c {
                        CellValue::Null | CellValue::Text(_) => c,
                        other => CellValue::Text(other.to_string()),
                    })
                    .collect();
                (ColumnKind::Categorical, texts)
            }
        };
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-null numeric values, in row order.
    pub fn numbers(&self) -> Vec<f64> {
        self.values
            .iter()
            .filter_map(CellValue::as_f64)
            .filter(|v| !v.is_nan())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ColumnPartition – numeric vs categorical column names
// ---------------------------------------------------------------------------

/// Column names split by kind, each list in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPartition {
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnPartition {
    pub fn is_numeric(&self, name: &str) -> bool {
        self.numeric.iter().any(|c| c == name)
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        self.categorical.iter().any(|c| c == name)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table, stored column by column.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// All columns must have the same length; the loaders guarantee it.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let n_rows = columns.first().map_or(0, Column::len);
        debug_assert!(columns.iter().all(|c| c.len() == n_rows));
        Dataset { columns, n_rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn partition(&self) -> ColumnPartition {
        let mut partition = ColumnPartition::default();
        for col in &self.columns {
            match col.kind {
                ColumnKind::Numeric => partition.numeric.push(col.name.clone()),
                ColumnKind::Categorical => partition.categorical.push(col.name.clone()),
            }
        }
        partition
    }

    /// Copy of the given rows (in the given order); column kinds are kept.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|col| Column {
                name: col.name.clone(),
                kind: col.kind,
                values: indices.iter().map(|&i| col.values[i].clone()).collect(),
            })
            .collect();
        Dataset {
            columns,
            n_rows: indices.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cells: &[&str]) -> Vec<Option<String>> {
        cells
            .iter()
            .map(|c| (!c.is_empty()).then(|| c.to_string()))
            .collect()
    }

    #[test]
    fn integers_stay_integers() {
        let col = Column::from_raw("score", raw(&["10", "", "30"]));
        assert_eq!(col.kind, ColumnKind::Numeric);
        assert_eq!(
            col.values,
            vec![CellValue::Integer(10), CellValue::Null, CellValue::Integer(30)]
        );
    }

    #[test]
    fn mixed_ints_and_floats_promote_to_float() {
        let col = Column::from_raw("avg", raw(&["1", "2.5"]));
        assert_eq!(col.kind, ColumnKind::Numeric);
        assert_eq!(col.values, vec![CellValue::Float(1.0), CellValue::Float(2.5)]);
    }

    #[test]
    fn mixed_text_keeps_raw_tokens() {
        let col = Column::from_raw("jersey", raw(&["007", "abc"]));
        assert_eq!(col.kind, ColumnKind::Categorical);
        assert_eq!(
            col.values,
            vec![CellValue::Text("007".into()), CellValue::Text("abc".into())]
        );
    }

    #[test]
    fn booleans_are_categorical() {
        let col = Column::from_raw("starter", raw(&["True", "false"]));
        assert_eq!(col.kind, ColumnKind::Categorical);
        assert_eq!(col.values, vec![CellValue::Bool(true), CellValue::Bool(false)]);
    }

    #[test]
    fn all_null_column_depends_on_row_count() {
        assert_eq!(Column::from_raw("a", raw(&["", ""])).kind, ColumnKind::Numeric);
        assert_eq!(Column::from_raw("a", Vec::new()).kind, ColumnKind::Categorical);
    }

    #[test]
    fn typed_cells_become_text_when_mixed() {
        let col = Column::from_cells(
            "mixed",
            vec![CellValue::Integer(3), CellValue::Text("x".into())],
        );
        assert_eq!(col.kind, ColumnKind::Categorical);
        assert_eq!(col.values[0], CellValue::Text("3".into()));
    }

    #[test]
    fn partition_covers_each_column_once() {
        let ds = Dataset::from_columns(vec![
            Column::from_raw("name", raw(&["A", "B"])),
            Column::from_raw("score", raw(&["1", "2"])),
            Column::from_raw("team", raw(&["X", "Y"])),
        ]);
        let p = ds.partition();
        assert_eq!(p.numeric, vec!["score"]);
        assert_eq!(p.categorical, vec!["name", "team"]);
        for name in ds.column_names() {
            assert!(p.is_numeric(&name) ^ p.is_categorical(&name));
        }
    }

    #[test]
    fn subset_keeps_kinds_and_order() {
        let ds = Dataset::from_columns(vec![
            Column::from_raw("name", raw(&["A", "B", "C"])),
            Column::from_raw("score", raw(&["1", "2", "3"])),
        ]);
        let sub = ds.subset(&[2, 0]);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.columns[0].values[0], CellValue::Text("C".into()));
        assert_eq!(sub.columns[1].kind, ColumnKind::Numeric);
    }

    #[test]
    fn numbers_skip_nulls_and_nan() {
        let col = Column::from_cells(
            "v",
            vec![CellValue::Float(1.0), CellValue::Null, CellValue::Float(f64::NAN)],
        );
        assert_eq!(col.numbers(), vec![1.0]);
    }
}
