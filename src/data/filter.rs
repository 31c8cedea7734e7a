use std::collections::HashSet;

use super::model::{CellValue, Dataset};
use super::stats::{SummaryTable, describe};

// ---------------------------------------------------------------------------
// Filter predicate: one categorical column equals one observed value
// ---------------------------------------------------------------------------

/// Observed non-null values of `column`, in order of first appearance.
/// Empty when the column does not exist.
pub fn filter_options(dataset: &Dataset, column: &str) -> Vec<CellValue> {
    let Some(col) = dataset.column(column) else {
        return Vec::new();
    };
    let mut seen: HashSet<&CellValue> = HashSet::new();
    col.values
        .iter()
        .filter(|v| !v.is_null() && seen.insert(*v))
        .cloned()
        .collect()
}

/// Return indices of rows whose `column` cell equals `value`.
///
/// Null never matches, so the result is empty for a missing column.
pub fn filtered_indices(dataset: &Dataset, column: &str, value: &CellValue) -> Vec<usize> {
    let Some(col) = dataset.column(column) else {
        return Vec::new();
    };
    col.values
        .iter()
        .enumerate()
        .filter(|(_, cell)| !cell.is_null() && *cell == value)
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Filtered view: the derived sub-table and its statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FilterView {
    pub column: String,
    pub value: CellValue,
    pub rows: Dataset,
    pub summary: SummaryTable,
}

impl FilterView {
    pub fn compute(dataset: &Dataset, column: &str, value: &CellValue) -> Self {
        let indices = filtered_indices(dataset, column, value);
        let rows = dataset.subset(&indices);
        let summary = describe(&rows);
        FilterView {
            column: column.to_string(),
            value: value.clone(),
            rows,
            summary,
        }
    }

    pub fn title(&self) -> String {
        format!("Stats for {}: {}", self.column, self.value)
    }
}
