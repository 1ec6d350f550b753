use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Table};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a record table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by records (recommended)
/// * `.json`    – `[{ "job_title": "...", "salary_in_usd": 123, ... }, ...]`
/// * `.parquet` – flat scalar columns
///
/// Missing cells (nulls and the usual NA tokens) come back as the
/// empty-string sentinel.
pub fn load_file(path: &Path) -> Result<Table> {
    load_file_with_text(path, &[])
}

/// Like [`load_file`], but `text_columns` keep their source strings as
/// `CellValue::Text` instead of being typed, so "007" stays "007".
pub fn load_file_with_text(path: &Path, text_columns: &[&str]) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let loaded = match ext.as_str() {
        "csv" => load_csv(path, text_columns),
        "json" => load_json(path, text_columns),
        "parquet" | "pq" => load_parquet(path, text_columns),
        other => Err(anyhow::anyhow!("Unsupported file extension: .{other}")),
    };

    loaded.map_err(|e| DashboardError::DataLoad {
        path: path.to_path_buf(),
        message: format!("{e:#}"),
    })
}

/// Re-express a typed cell as text, keeping the missing sentinel.
fn into_text(cell: CellValue) -> CellValue {
    match cell {
        CellValue::Text(_) => cell,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// How a CSV column is typed: every non-missing cell must fit the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Text,
}

/// Type a whole column at once, as pandas does: integer if every present
/// cell is an integer, float if every present cell is a finite number, text
/// otherwise.
fn column_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut kind = ColumnKind::Integer;
    for cell in cells.filter(|c| !CellValue::is_na_token(c)) {
        if kind == ColumnKind::Integer && cell.parse::<i64>().is_ok() {
            continue;
        }
        match cell.parse::<f64>() {
            Ok(f) if f.is_finite() => kind = ColumnKind::Float,
            _ => return ColumnKind::Text,
        }
    }
    kind
}

fn typed_cell(raw: &str, kind: ColumnKind) -> CellValue {
    if CellValue::is_na_token(raw) {
        return CellValue::empty();
    }
    let text = || CellValue::Text(raw.to_string());
    match kind {
        ColumnKind::Integer => raw.parse().map(CellValue::Integer).unwrap_or_else(|_| text()),
        ColumnKind::Float => raw.parse().map(CellValue::Float).unwrap_or_else(|_| text()),
        ColumnKind::Text => text(),
    }
}

/// CSV layout: header row with column names, one record per line.
/// Records with a different number of fields than the header are malformed.
fn load_csv(path: &Path, text_columns: &[&str]) -> anyhow::Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let records = reader
        .records()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("CSV row {row_no}")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let kinds: Vec<ColumnKind> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            if text_columns.contains(&name.as_str()) {
                ColumnKind::Text
            } else {
                column_kind(records.iter().filter_map(|r| r.get(i)))
            }
        })
        .collect();

    let mut table = Table::new(headers);
    for (row_no, record) in records.iter().enumerate() {
        let row: Vec<CellValue> = record
            .iter()
            .zip(&kinds)
            .map(|(raw, kind)| typed_cell(raw, *kind))
            .collect();
        table
            .push_row(row)
            .with_context(|| format!("CSV row {row_no}"))?;
    }

    Ok(table)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "job_title": "Data Scientist", "remote_ratio": 100, "salary_in_usd": 150000 },
///   ...
/// ]
/// ```
///
/// Columns are ordered by first appearance. Absent keys and `null` become
/// the empty-string sentinel.
fn load_json(path: &Path, text_columns: &[&str]) -> anyhow::Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let mut table = Table::new(columns.clone());
    for (i, obj) in objects.into_iter().enumerate() {
        let row = columns
            .iter()
            .map(|col| {
                let cell = obj.get(col).map(json_to_cell).unwrap_or_else(CellValue::empty);
                if text_columns.contains(&col.as_str()) {
                    into_text(cell)
                } else {
                    cell
                }
            })
            .collect();
        table.push_row(row).with_context(|| format!("Row {i}"))?;
    }

    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if CellValue::is_na_token(s) => CellValue::empty(),
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64().filter(|f| f.is_finite()) {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Text(b.to_string()),
        JsonValue::Null => CellValue::empty(),
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file of flat scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), as well as by `generate_sample`.
fn load_parquet(path: &Path, text_columns: &[&str]) -> anyhow::Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let keep_text: Vec<bool> = columns
        .iter()
        .map(|c| text_columns.contains(&c.as_str()))
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = Table::new(columns);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let n_rows = batch.num_rows();

        for row in 0..n_rows {
            let cells = batch
                .columns()
                .iter()
                .zip(&keep_text)
                .map(|(col, &text)| -> anyhow::Result<CellValue> {
                    let cell = extract_cell(col, row)?;
                    Ok(if text { into_text(cell) } else { cell })
                })
                .collect::<anyhow::Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            table.push_row(cells)?;
        }
    }

    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> anyhow::Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::empty());
    }
    let cell = match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            CellValue::Text(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            finite(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            finite(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            CellValue::Text(arr.value(row).to_string())
        }
        other => bail!("Unsupported parquet column type {other:?}"),
    };
    Ok(cell)
}

/// NaN and infinities read as missing.
fn finite(v: f64) -> CellValue {
    if v.is_finite() {
        CellValue::Float(v)
    } else {
        CellValue::empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        file
    }

    #[test]
    fn csv_missing_cells_become_empty_text() {
        let file = write_temp(
            ".csv",
            "job_title,remote_ratio,salary_in_usd\nData Scientist,,100\nML Engineer,50,\n",
        );
        let table = load_file(file.path()).expect("load csv");
        assert_eq!(table.len(), 2);
        assert_eq!(table.columns(), ["job_title", "remote_ratio", "salary_in_usd"]);
        assert_eq!(table.rows()[0][1], CellValue::empty());
        assert_eq!(table.rows()[1][1], CellValue::Integer(50));
        assert_eq!(table.rows()[1][2], CellValue::empty());
    }

    #[test]
    fn csv_ragged_rows_are_malformed() {
        let file = write_temp(".csv", "a,b\n1,2\n3\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(matches!(err, DashboardError::DataLoad { .. }));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::DataLoad { .. }));
    }

    #[test]
    fn unsupported_extension_is_a_load_error() {
        let file = write_temp(".xlsx", "whatever");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn json_records_fill_absent_keys() {
        let file = write_temp(
            ".json",
            r#"[{"job_title": "A", "salary_in_usd": 100},
                {"job_title": "B", "remote_ratio": null}]"#,
        );
        let table = load_file(file.path()).expect("load json");
        assert_eq!(table.columns(), ["job_title", "salary_in_usd", "remote_ratio"]);
        assert_eq!(table.rows()[0][2], CellValue::empty());
        assert_eq!(table.rows()[1][1], CellValue::empty());
        assert_eq!(table.rows()[0][1], CellValue::Integer(100));
    }

    #[test]
    fn csv_columns_are_typed_as_a_whole() {
        let file = write_temp(
            ".csv",
            "job_title,zip,rate\n007,007,1\nData Scientist,12,1.5\n",
        );
        let table = load_file(file.path()).expect("load csv");
        // one non-numeric cell keeps the whole column as source text
        assert_eq!(table.rows()[0][0], CellValue::Text("007".into()));
        assert_eq!(table.rows()[0][1], CellValue::Integer(7));
        assert_eq!(table.rows()[0][2], CellValue::Float(1.0));
        assert_eq!(table.rows()[1][2], CellValue::Float(1.5));
    }

    #[test]
    fn text_columns_keep_source_strings() {
        let file = write_temp(".csv", "job_title,salary_in_usd\n007,100\n1.50,200\n");
        let table = load_file_with_text(file.path(), &["job_title"]).expect("load csv");
        let titles: Vec<_> = table.column_values("job_title").unwrap().cloned().collect();
        assert_eq!(
            titles,
            [CellValue::Text("007".into()), CellValue::Text("1.50".into())]
        );
        assert_eq!(table.rows()[1][1], CellValue::Integer(200));
    }

    #[test]
    fn na_tokens_load_as_missing() {
        let file = write_temp(
            ".csv",
            "job_title,salary_in_usd\nA,NaN\nN/A,100\nB,nan\nC,inf\n",
        );
        let table = load_file(file.path()).expect("load csv");
        assert_eq!(table.rows()[0][1], CellValue::empty());
        assert_eq!(table.rows()[1][0], CellValue::empty());
        assert_eq!(table.rows()[2][1], CellValue::empty());
        // an infinity is not a number we keep, so the column stays text
        assert_eq!(table.rows()[3][1], CellValue::Text("inf".into()));
        assert!(!table.is_numeric_column("salary_in_usd"));
    }

    #[test]
    fn parquet_columns_map_to_cells() {
        use arrow::array::ArrayRef;
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![Some("007"), None, Some("Data Scientist")])),
            Arc::new(Int64Array::from(vec![Some(100), Some(200), None])),
            Arc::new(Int32Array::from(vec![0, 50, 100])),
            Arc::new(Float64Array::from(vec![1.5, f64::NAN, 3.0])),
            Arc::new(BooleanArray::from(vec![true, false, true])),
        ];
        let names = ["job_title", "salary_in_usd", "remote_ratio", "score", "flag"];
        let fields: Vec<Field> = names
            .iter()
            .zip(&columns)
            .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
            .collect();
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).expect("record batch");

        let file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .expect("create temp file");
        let mut writer =
            ArrowWriter::try_new(file.reopen().expect("reopen"), schema, None).expect("writer");
        writer.write(&batch).expect("write batch");
        writer.close().expect("close writer");

        let table = load_file(file.path()).expect("load parquet");
        assert_eq!(table.columns(), names);
        assert_eq!(
            table.rows()[0],
            [
                CellValue::Text("007".into()),
                CellValue::Integer(100),
                CellValue::Integer(0),
                CellValue::Float(1.5),
                CellValue::Text("true".into()),
            ]
        );
        assert_eq!(table.rows()[1][0], CellValue::empty());
        assert_eq!(table.rows()[1][3], CellValue::empty());
        assert_eq!(table.rows()[2][1], CellValue::empty());

        let as_text = load_file_with_text(file.path(), &["remote_ratio"]).expect("load parquet");
        assert_eq!(as_text.rows()[1][2], CellValue::Text("50".into()));
    }
}
