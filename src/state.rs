use std::path::Path;

use anyhow::Result;

use crate::chart::{ChartConfig, ChartData, ChartError, build_chart};
use crate::chart::view3d::ViewAngles;
use crate::color::ColorMap;
use crate::data::filter::{FilterView, filter_options};
use crate::data::loader;
use crate::data::model::{CellValue, ColumnPartition, Dataset};
use crate::data::stats::{CorrelationMatrix, SummaryTable, correlation, describe};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Dataset>,

    /// File name of the loaded dataset, for the top bar.
    pub source_name: Option<String>,

    /// Numeric / categorical split of the dataset's columns.
    pub partition: ColumnPartition,

    /// Describe table of the whole dataset.
    pub summary: SummaryTable,

    /// Pearson correlation over all numeric columns.
    pub correlation: CorrelationMatrix,

    /// Side panel selections.
    pub chart_config: ChartConfig,

    /// Chart built from `chart_config`, or why it could not be built.
    pub chart: Option<Result<ChartData, ChartError>>,

    /// Config the cached `chart` was built from.
    chart_built_for: Option<ChartConfig>,

    /// Colours for the chart's groups.
    pub color_map: Option<ColorMap>,

    /// Camera for the 3D scatter.
    pub view3d: ViewAngles,

    /// Categorical column and value of the filtered view.
    pub filter_column: Option<String>,
    pub filter_value: Option<CellValue>,
    pub filter_view: Option<FilterView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load a file from disk, replacing any current dataset.
    pub fn load_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let result = loader::load_file(path);
        self.apply_load(name, result);
    }

    /// Load a file handed over as bytes (e.g. dropped without a path).
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) {
        let result = loader::load_bytes(name, bytes);
        self.apply_load(name.to_string(), result);
    }

    fn apply_load(&mut self, name: String, result: Result<Dataset>) {
        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {name}: {} rows, numeric {:?}, categorical {:?}",
                    dataset.len(),
                    dataset.partition().numeric,
                    dataset.partition().categorical
                );
                self.set_dataset(name, dataset);
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e:#}");
                self.clear();
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset: derive the partition, statistics,
    /// default selections and filter.
    pub fn set_dataset(&mut self, name: String, dataset: Dataset) {
        self.partition = dataset.partition();
        self.summary = describe(&dataset);
        self.correlation = correlation(&dataset);
        self.chart_config = ChartConfig::defaults_for(&dataset);
        self.chart = None;
        self.chart_built_for = None;
        self.view3d = ViewAngles::default();

        self.filter_column = self.partition.categorical.first().cloned();
        self.filter_value = self
            .filter_column
            .as_deref()
            .and_then(|col| filter_options(&dataset, col).into_iter().next());

        self.dataset = Some(dataset);
        self.source_name = Some(name);
        self.status_message = None;

        self.refilter();
        self.sync_chart();
    }

    /// Drop the dataset and everything derived from it.
    pub fn clear(&mut self) {
        *self = AppState::default();
    }

    /// Rebuild the chart if the selections changed since the last build.
    pub fn sync_chart(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        if self.chart_built_for.as_ref() == Some(&self.chart_config) {
            return;
        }
        log::debug!("Chart config changed: {:?}", self.chart_config);

        let built = self
            .chart_config
            .resolve(ds)
            .map(|spec| build_chart(ds, &spec));
        if let Err(e) = &built {
            log::warn!("Cannot draw {}: {e}", self.chart_config.kind);
        }
        self.color_map = built
            .as_ref()
            .ok()
            .map(|chart| ColorMap::new(&chart.groups));
        self.chart = Some(built);
        self.chart_built_for = Some(self.chart_config.clone());
    }

    /// Observed values of the current filter column.
    pub fn filter_values(&self) -> Vec<CellValue> {
        match (&self.dataset, &self.filter_column) {
            (Some(ds), Some(col)) => filter_options(ds, col),
            _ => Vec::new(),
        }
    }

    /// Switch the filter column; the value resets to its first option.
    pub fn set_filter_column(&mut self, column: String) {
        if self.filter_column.as_deref() == Some(column.as_str()) {
            return;
        }
        log::debug!("Filter column: {column}");
        self.filter_column = Some(column);
        self.filter_value = self.filter_values().into_iter().next();
        self.refilter();
    }

    pub fn set_filter_value(&mut self, value: CellValue) {
        if self.filter_value.as_ref() == Some(&value) {
            return;
        }
        log::debug!("Filter value: {value}");
        self.filter_value = Some(value);
        self.refilter();
    }

    /// Apply one frame's picks from the filter combos. A new column wins:
    /// its first value replaces whatever value was picked alongside it.
    pub fn select_filter(&mut self, column: Option<String>, value: Option<CellValue>) {
        match column {
            Some(column) if self.filter_column.as_deref() != Some(column.as_str()) => {
                self.set_filter_column(column);
            }
            _ => {
                if let Some(value) = value {
                    self.set_filter_value(value);
                }
            }
        }
    }

    /// Recompute the filtered view after a filter change.
    pub fn refilter(&mut self) {
        self.filter_view = match (&self.dataset, &self.filter_column, &self.filter_value) {
            (Some(ds), Some(col), Some(value)) => Some(FilterView::compute(ds, col, value)),
            _ => None,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartBody, ChartKind};
    use anyhow::{Context, bail};

    const EXAMPLE: &[u8] = b"name,score,team\nA,10,X\nB,20,Y\nC,30,X\n";

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.load_bytes("stats.csv", EXAMPLE);
        state
    }

    #[test]
    fn starts_in_prompt_state() {
        let state = AppState::default();
        assert!(state.dataset.is_none());
        assert!(state.chart.is_none());
        assert!(state.filter_view.is_none());
    }

    #[test]
    fn upload_derives_everything() -> anyhow::Result<()> {
        let state = loaded();
        assert_eq!(state.source_name.as_deref(), Some("stats.csv"));
        assert_eq!(state.partition.numeric, vec!["score"]);
        assert_eq!(state.partition.categorical, vec!["name", "team"]);
        assert_eq!(state.summary.columns.len(), 3);
        assert_eq!(state.correlation.columns, vec!["score"]);
        let chart = state.chart.clone().context("chart")?;
        assert!(chart.is_ok());
        assert!(state.status_message.is_none());
        Ok(())
    }

    #[test]
    fn malformed_upload_shows_error_and_nothing_else() {
        let mut state = loaded();
        state.load_bytes("broken.csv", b"a,b\n1,2,3\n");
        assert!(state.dataset.is_none());
        assert!(state.chart.is_none());
        assert!(state.filter_view.is_none());
        assert!(state.summary.rows.is_empty());
        let msg = state.status_message.unwrap_or_default();
        assert!(msg.starts_with("Error:"));
    }

    #[test]
    fn filter_defaults_and_changes() -> anyhow::Result<()> {
        let mut state = loaded();
        assert_eq!(state.filter_column.as_deref(), Some("name"));
        assert_eq!(state.filter_value, Some(CellValue::Text("A".into())));

        state.set_filter_column("team".into());
        assert_eq!(state.filter_value, Some(CellValue::Text("X".into())));
        let view = state.filter_view.as_ref().context("view")?;
        assert_eq!(view.rows.len(), 2);

        state.set_filter_value(CellValue::Text("Y".into()));
        let view = state.filter_view.as_ref().context("view")?;
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.title(), "Stats for team: Y");
        Ok(())
    }

    #[test]
    fn new_filter_column_overrides_a_stale_value_pick() -> anyhow::Result<()> {
        let mut state = loaded();
        state.select_filter(Some("team".into()), Some(CellValue::Text("C".into())));
        assert_eq!(state.filter_column.as_deref(), Some("team"));
        assert_eq!(state.filter_value, Some(CellValue::Text("X".into())));

        state.select_filter(Some("team".into()), Some(CellValue::Text("Y".into())));
        let view = state.filter_view.as_ref().context("view")?;
        assert_eq!(view.title(), "Stats for team: Y");
        Ok(())
    }

    #[test]
    fn no_categorical_columns_means_no_filter() {
        let mut state = AppState::default();
        state.load_bytes("nums.csv", b"a,b\n1,2\n");
        assert!(state.filter_column.is_none());
        assert!(state.filter_view.is_none());
    }

    #[test]
    fn chart_rebuilds_only_on_change() -> anyhow::Result<()> {
        let mut state = loaded();
        state.chart_config.kind = ChartKind::Pie;
        state.sync_chart();
        let Some(Ok(chart)) = &state.chart else {
            bail!("expected a chart");
        };
        assert!(matches!(chart.body, ChartBody::Pie(_)));

        state.chart_config.color = Some("team".into());
        state.chart_config.kind = ChartKind::Scatter;
        state.sync_chart();
        let Some(Ok(chart)) = &state.chart else {
            bail!("expected a chart");
        };
        assert_eq!(chart.groups, vec!["X", "Y"]);
        let colors = state.color_map.as_ref().context("colors")?;
        assert_ne!(colors.color_for("X"), colors.color_for("Y"));
        Ok(())
    }

    #[test]
    fn chart_errors_are_kept_for_display() {
        let mut state = AppState::default();
        state.load_bytes("teams.csv", b"team\nX\n");
        assert!(matches!(
            state.chart,
            Some(Err(ChartError::NoNumericColumns { .. }))
        ));
        assert!(state.dataset.is_some());
    }

    #[test]
    fn clear_returns_to_prompt() {
        let mut state = loaded();
        state.clear();
        assert!(state.dataset.is_none());
        assert!(state.source_name.is_none());
    }
}
