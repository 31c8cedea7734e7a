use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::reader::ChunkReader;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, Dataset};

/// Tokens read as missing values, matching the usual CSV reader defaults.
pub const NULL_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-nan", "NULL", "null", "None", "#N/A", "<NA>",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per line (primary format)
/// * `.json`    – `[{ "player": "A", "points": 10, ... }, ...]`
/// * `.parquet` – any table of scalar columns
pub fn load_file(path: &Path) -> Result<Dataset> {
    match extension_of(path).as_str() {
        "csv" => {
            let file = std::fs::File::open(path).context("opening CSV")?;
            load_csv_reader(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            load_json_str(&text)
        }
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Load a dataset from in-memory bytes, using `name` for format dispatch.
/// Used for files dropped onto the window without a backing path.
pub fn load_bytes(name: &str, bytes: &[u8]) -> Result<Dataset> {
    match extension_of(Path::new(name)).as_str() {
        "csv" => load_csv_reader(bytes),
        "json" => {
            let text = std::str::from_utf8(bytes).context("JSON file is not valid UTF-8")?;
            load_json_str(text)
        }
        "parquet" | "pq" => load_parquet_reader(Bytes::copy_from_slice(bytes)),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: a header row with column names, then one record per line.
///
/// A record with more fields than the header is malformed; a record with
/// fewer fields is padded with nulls.
pub fn load_csv_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let header_record = reader.headers().context("reading CSV headers")?.clone();
    if header_record.is_empty() {
        bail!("No columns to parse from file");
    }
    let headers = clean_headers(header_record.iter());
    let n_cols = headers.len();

    let mut raw_columns: Vec<Vec<Option<String>>> = vec![Vec::new(); n_cols];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;
        if record.len() > n_cols {
            bail!(
                "CSV row {}: expected {n_cols} fields, saw {}",
                row_no + 1,
                record.len()
            );
        }
        for (col_idx, cells) in raw_columns.iter_mut().enumerate() {
            let cell = record
                .get(col_idx)
                .filter(|value| !is_null_token(value))
                .map(str::to_string);
            cells.push(cell);
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw_columns)
        .map(|(name, cells)| Column::from_raw(name, cells))
        .collect();
    Ok(Dataset::from_columns(columns))
}

/// Only exact tokens count; a cell of spaces stays text.
fn is_null_token(value: &str) -> bool {
    NULL_TOKENS.contains(&value)
}

/// Name blank headers `Unnamed: <i>` and suffix repeats `name.1`, `name.2`.
fn clean_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut repeats: HashMap<String, usize> = HashMap::new();
    for (i, header) in raw.enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            header.to_string()
        };
        let mut name = base.clone();
        while names.contains(&name) {
            let n = repeats.entry(base.clone()).or_insert(0);
            *n += 1;
            name = format!("{base}.{n}");
        }
        names.push(name);
    }
    names
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "player": "A", "points": 10, "team": "X" },
///   ...
/// ]
/// ```
///
/// Columns follow the order keys first appear in the file; keys missing
/// from a record are nulls.
fn load_json_str(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }
    if names.is_empty() {
        bail!("No columns to parse from file");
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let cells = records
                .iter()
                .map(|rec| rec.get(&name).map_or(CellValue::Null, json_to_cell))
                .collect();
            Column::from_cells(name, cells)
        })
        .collect();
    Ok(Dataset::from_columns(columns))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of scalar columns (strings, ints, floats, bools).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    load_parquet_reader(file)
}

fn load_parquet_reader<T: ChunkReader + 'static>(source: T) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(source)
        .context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    if names.is_empty() {
        bail!("No columns to parse from file");
    }
    let reader = builder.build().context("building parquet reader")?;

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, column_cells) in cells.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            column_cells.extend((0..batch.num_rows()).map(|row| extract_cell(array, row)));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::from_cells(name, values))
        .collect();
    Ok(Dataset::from_columns(columns))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => {
            CellValue::Integer(col.as_primitive::<UInt16Type>().value(row).into())
        }
        DataType::UInt32 => {
            CellValue::Integer(col.as_primitive::<UInt32Type>().value(row).into())
        }
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(CellValue::Float(v as f64), CellValue::Integer)
        }
        DataType::Float32 => {
            CellValue::Float(col.as_primitive::<Float32Type>().value(row).into())
        }
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => match arrow::util::display::array_value_to_string(col, row) {
            Ok(text) => CellValue::Text(text),
            Err(_) => CellValue::Null,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ColumnKind;

    #[test]
    fn loads_the_reference_example() -> Result<()> {
        let ds = load_csv_reader("name,score,team\nA,10,X\nB,20,Y\nC,30,X".as_bytes())?;
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.column_names(), vec!["name", "score", "team"]);
        let p = ds.partition();
        assert_eq!(p.numeric, vec!["score"]);
        assert_eq!(p.categorical, vec!["name", "team"]);
        Ok(())
    }

    #[test]
    fn null_tokens_become_nulls() -> Result<()> {
        let ds = load_csv_reader("a,b\n1,NA\n,x\nN/A,<NA>".as_bytes())?;
        let a = ds.column("a").context("a")?;
        assert_eq!(a.kind, ColumnKind::Numeric);
        assert_eq!(
            a.values,
            vec![CellValue::Integer(1), CellValue::Null, CellValue::Null]
        );
        let b = ds.column("b").context("b")?;
        assert_eq!(b.values[0], CellValue::Null);
        assert_eq!(b.values[1], CellValue::Text("x".into()));
        Ok(())
    }

    #[test]
    fn whitespace_cells_stay_text() -> Result<()> {
        let ds = load_csv_reader("a,b\n1, \n2,x".as_bytes())?;
        let b = ds.column("b").context("b")?;
        assert_eq!(b.kind, ColumnKind::Categorical);
        assert_eq!(b.values[0], CellValue::Text(" ".into()));
        Ok(())
    }

    #[test]
    fn short_rows_are_padded() -> Result<()> {
        let ds = load_csv_reader("a,b,c\n1,2\n3,4,5".as_bytes())?;
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column("c").context("c")?.values[0], CellValue::Null);
        Ok(())
    }

    #[test]
    fn long_rows_are_rejected() {
        let err = load_csv_reader("a,b\n1,2,3".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("expected 2 fields"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(load_csv_reader("".as_bytes()).is_err());
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let bytes: &[u8] = b"a,b\n\xff\xfe,1\n";
        assert!(load_csv_reader(bytes).is_err());
    }

    #[test]
    fn header_only_file_has_no_rows() -> Result<()> {
        let ds = load_csv_reader("a,b\n".as_bytes())?;
        assert!(ds.is_empty());
        assert_eq!(ds.n_columns(), 2);
        assert_eq!(ds.partition().categorical, vec!["a", "b"]);
        Ok(())
    }

    #[test]
    fn headers_are_cleaned() -> Result<()> {
        let ds = load_csv_reader(",pts,pts,pts\n0,1,2,3".as_bytes())?;
        assert_eq!(ds.column_names(), vec!["Unnamed: 0", "pts", "pts.1", "pts.2"]);
        Ok(())
    }

    #[test]
    fn json_records_fill_missing_keys() -> Result<()> {
        let ds = load_bytes(
            "stats.json",
            br#"[{"player":"A","points":10},{"player":"B"}]"#,
        )?;
        assert_eq!(ds.len(), 2);
        let points = ds.column("points").context("points")?;
        assert_eq!(points.kind, ColumnKind::Numeric);
        assert_eq!(points.values[1], CellValue::Null);
        Ok(())
    }

    #[test]
    fn json_columns_keep_file_order() -> Result<()> {
        let ds = load_bytes(
            "stats.json",
            br#"[{"team":"X","score":10,"name":"A"},{"team":"Y","assists":2}]"#,
        )?;
        assert_eq!(ds.column_names(), vec!["team", "score", "name", "assists"]);
        assert_eq!(ds.partition().categorical, vec!["team", "name"]);
        Ok(())
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(load_bytes("stats.json", br#"{"player":"A"}"#).is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_bytes("stats.xlsx", b"").unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn load_file_dispatches_on_extension() -> Result<()> {
        let path = std::env::temp_dir().join("sports_dashboard_loader_test.CSV");
        std::fs::write(&path, "team,wins\nX,3\nY,5\n")?;
        let ds = load_file(&path)?;
        std::fs::remove_file(&path)?;
        assert_eq!(ds.partition().numeric, vec!["wins"]);
        Ok(())
    }

    /// One batch covering the widened integer types, a bool, nulls and a
    /// date that falls back to its display string.
    fn parquet_bytes() -> Result<Vec<u8>> {
        use arrow::array::{
            ArrayRef, BooleanArray, Date32Array, Float32Array, Int32Array, StringArray,
            UInt8Array,
        };
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("team", DataType::Utf8, true),
            Field::new("pts", DataType::Int32, true),
            Field::new("jersey", DataType::UInt8, false),
            Field::new("ratio", DataType::Float32, false),
            Field::new("starter", DataType::Boolean, false),
            Field::new("played_on", DataType::Date32, false),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![Some("X"), None, Some("Y")])),
            Arc::new(Int32Array::from(vec![Some(10), Some(20), None])),
            Arc::new(UInt8Array::from(vec![7, 23, 30])),
            Arc::new(Float32Array::from(vec![0.5, 1.0, 1.5])),
            Arc::new(BooleanArray::from(vec![true, false, true])),
            Arc::new(Date32Array::from(vec![19723, 19724, 19725])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns)?;
        let mut writer = ArrowWriter::try_new(Vec::new(), schema, None)?;
        writer.write(&batch)?;
        Ok(writer.into_inner()?)
    }

    fn check_parquet_dataset(ds: &Dataset) -> Result<()> {
        assert_eq!(ds.len(), 3);
        let p = ds.partition();
        assert_eq!(p.numeric, vec!["pts", "jersey", "ratio"]);
        assert_eq!(p.categorical, vec!["team", "starter", "played_on"]);

        let team = ds.column("team").context("team")?;
        assert_eq!(team.values[1], CellValue::Null);
        let pts = ds.column("pts").context("pts")?;
        assert_eq!(
            pts.values,
            vec![CellValue::Integer(10), CellValue::Integer(20), CellValue::Null]
        );
        let jersey = ds.column("jersey").context("jersey")?;
        assert_eq!(jersey.values[1], CellValue::Integer(23));
        let ratio = ds.column("ratio").context("ratio")?;
        assert_eq!(ratio.values[0], CellValue::Float(0.5));
        let starter = ds.column("starter").context("starter")?;
        assert_eq!(starter.values[0], CellValue::Bool(true));
        let played_on = ds.column("played_on").context("played_on")?;
        assert!(matches!(&played_on.values[0], CellValue::Text(s) if s.starts_with("2024-")));
        Ok(())
    }

    #[test]
    fn parquet_file_round_trip() -> Result<()> {
        let path = std::env::temp_dir().join("sports_dashboard_loader_test.parquet");
        std::fs::write(&path, parquet_bytes()?)?;
        let ds = load_file(&path);
        std::fs::remove_file(&path)?;
        check_parquet_dataset(&ds?)
    }

    #[test]
    fn parquet_bytes_load_without_a_path() -> Result<()> {
        let ds = load_bytes("dropped.parquet", &parquet_bytes()?)?;
        check_parquet_dataset(&ds)
    }
}
