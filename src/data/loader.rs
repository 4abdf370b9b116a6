use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use log::{info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Sample, TraceCollection, TraceRecord};

/// Root directory for library names that are not a directory themselves.
pub const LIBRARY_ROOT_ENV: &str = "DRIVE_TEST_LIBRARY_ROOT";
const DEFAULT_LIBRARY_ROOT: &str = "data";

const SUPPORTED_EXTENSIONS: [&str; 4] = ["csv", "json", "parquet", "pq"];

// ---------------------------------------------------------------------------
// Library discovery
// ---------------------------------------------------------------------------

/// One trace file found in a library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSetDescriptor {
    pub index: usize,
    pub name: String,
    pub path: PathBuf,
}

/// Resolve a library argument to its directory.
///
/// The argument is used as-is when it names a directory, otherwise it is looked
/// up under `$DRIVE_TEST_LIBRARY_ROOT` (default `data`).
pub fn library_dir(library: &str) -> PathBuf {
    let direct = PathBuf::from(library);
    if direct.is_dir() {
        return direct;
    }
    let root = std::env::var_os(LIBRARY_ROOT_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LIBRARY_ROOT));
    root.join(library)
}

/// List the supported trace files of a library, sorted by file name.
pub fn list_available(library: &str) -> Result<Vec<DataSetDescriptor>> {
    let dir = library_dir(library);
    let entries = std::fs::read_dir(&dir)
        .with_context(|| format!("reading library directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.context("reading library entry")?.path();
        if path.is_file() && SUPPORTED_EXTENSIONS.contains(&extension(&path).as_str()) {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| DataSetDescriptor {
            index,
            name: file_stem(&path),
            path,
        })
        .collect())
}

/// Print the data-sets of a library, one per line.
pub fn print_list(descriptors: &[DataSetDescriptor]) {
    for d in descriptors {
        println!("{:>4}  {}", d.index, d.name);
    }
}

/// Load every data-set of the list, in order.
pub fn load_collection(descriptors: &[DataSetDescriptor]) -> Result<TraceCollection> {
    let records = descriptors
        .iter()
        .map(|d| {
            let record = load_file(&d.path)
                .with_context(|| format!("loading data-set {} ({})", d.index, d.path.display()))?;
            if record.is_empty() {
                warn!("'{}' contains no samples", record.name);
            }
            info!(
                "Loaded '{}': {} samples, {} columns",
                record.name,
                record.len(),
                record.column_names.len()
            );
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TraceCollection::new(records))
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one trace file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – one scalar column per metric (recommended)
/// * `.json`    – `[{ "Velocity": 3.2, "Bandwidth downlink": 20, ... }, ...]`
/// * `.csv`     – header row with column names, one sample per line
pub fn load_file(path: &Path) -> Result<TraceRecord> {
    let name = file_stem(path);
    match extension(path).as_str() {
        "parquet" | "pq" => load_parquet(path, name),
        "json" => load_json(path, name),
        "csv" => load_csv(path, name),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Velocity": 12.5, "Application throughput downlink": 31250000, ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path, name: String) -> Result<TraceRecord> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let samples = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let obj = row
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(obj
                .iter()
                .map(|(key, val)| (key.clone(), json_to_cell(val)))
                .collect::<Sample>())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(TraceRecord::from_samples(name, samples))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one sample per record.
/// Empty cells are missing values.
fn load_csv(path: &Path, name: String) -> Result<TraceRecord> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut samples = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let sample: Sample = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), guess_cell_type(value.trim())))
            .collect();
        samples.push(sample);
    }

    Ok(TraceRecord::with_columns(name, headers, samples))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet trace: every column is a scalar metric.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, name: String) -> Result<TraceRecord> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    for field in builder.schema().fields() {
        let data_type = field.data_type();
        if !is_extracted_directly(data_type) && !data_type.is_numeric() {
            warn!(
                "{name}: column '{}' has unsupported type {data_type:?}, reading it as missing",
                field.name()
            );
        }
    }
    let reader = builder.build().context("building parquet reader")?;

    let mut samples = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let arrays: Vec<ArrayRef> = batch.columns().iter().map(widen_numeric).collect();
        for row in 0..batch.num_rows() {
            let sample: Sample = column_names
                .iter()
                .zip(&arrays)
                .map(|(col, array)| (col.clone(), extract_cell(array, row)))
                .collect();
            samples.push(sample);
        }
    }

    Ok(TraceRecord::with_columns(name, column_names, samples))
}

fn is_extracted_directly(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8
            | DataType::LargeUtf8
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64
            | DataType::Boolean
    )
}

/// Cast narrow, unsigned, half-precision and decimal columns to `Float64`.
/// Any other column is returned as-is.
fn widen_numeric(array: &ArrayRef) -> ArrayRef {
    let data_type = array.data_type();
    if is_extracted_directly(data_type) || !data_type.is_numeric() {
        return Arc::clone(array);
    }
    match cast(array, &DataType::Float64) {
        Ok(widened) => widened,
        Err(e) => {
            warn!("cannot read {data_type:?} column as numbers: {e}");
            Arc::clone(array)
        }
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map_or(CellValue::Null, |a| CellValue::Integer(i64::from(a.value(row)))),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map_or(CellValue::Null, |a| CellValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .map_or(CellValue::Null, |a| CellValue::Float(f64::from(a.value(row)))),
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or(CellValue::Null, |a| CellValue::Float(a.value(row))),
        DataType::Boolean => col
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map_or(CellValue::Null, |a| CellValue::Bool(a.value(row))),
        _ => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    use crate::data::model::columns;

    fn write(dir: &Path, file: &str, contents: &str) -> PathBuf {
        let path = dir.join(file);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn lists_supported_files_sorted() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "b_drive.csv", "Velocity\n1\n");
        write(dir.path(), "a_drive.json", "[]");
        write(dir.path(), "notes.txt", "ignored");
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let list = list_available(dir.path().to_str().unwrap()).unwrap();
        let names: Vec<_> = list.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a_drive", "b_drive"]);
        assert_eq!(list[1].index, 1);
    }

    #[test]
    fn missing_library_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(list_available(missing.to_str().unwrap()).is_err());
    }

    #[test]
    fn csv_cells_are_typed() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "trace.csv",
            "Velocity,MAC downlink throughput,Cell\n0,1.5e6,A\n3.5,,B\n",
        );
        let rec = load_file(&path).unwrap();
        assert_eq!(rec.name, "trace");
        assert_eq!(
            rec.column_names,
            vec![columns::VELOCITY, columns::MAC_THROUGHPUT_DL, "Cell"]
        );
        assert_eq!(rec.value(0, columns::VELOCITY), &CellValue::Integer(0));
        assert_eq!(rec.value(0, columns::MAC_THROUGHPUT_DL), &CellValue::Float(1.5e6));
        assert_eq!(rec.value(1, columns::MAC_THROUGHPUT_DL), &CellValue::Null);
        assert_eq!(rec.value(1, "Cell"), &CellValue::String("B".into()));
    }

    #[test]
    fn json_records() {
        let dir = TempDir::new().unwrap();
        let path = write(
            dir.path(),
            "trace.json",
            r#"[{"Velocity": 2, "Bandwidth downlink": 20.0}, {"Velocity": null}]"#,
        );
        let rec = load_file(&path).unwrap();
        assert_eq!(rec.len(), 2);
        assert_eq!(rec.value(0, columns::BANDWIDTH_DL).as_f64(), Some(20.0));
        assert!(rec.value(1, columns::VELOCITY).is_null());
        assert!(rec.has_column(columns::BANDWIDTH_DL));
    }

    #[test]
    fn json_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "trace.json", r#"{"Velocity": 1}"#);
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn parquet_scalar_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new(columns::VELOCITY, DataType::Float64, true),
            Field::new(columns::BANDWIDTH_DL, DataType::Int64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![Some(1.5), None])),
                Arc::new(Int64Array::from(vec![10, 20])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let rec = load_file(&path).unwrap();
        assert_eq!(rec.column_names, vec![columns::VELOCITY, columns::BANDWIDTH_DL]);
        assert_eq!(rec.value(0, columns::VELOCITY), &CellValue::Float(1.5));
        assert!(rec.value(1, columns::VELOCITY).is_null());
        assert_eq!(rec.value(1, columns::BANDWIDTH_DL), &CellValue::Integer(20));
    }

    #[test]
    fn parquet_narrow_integers_read_as_numbers() {
        use arrow::array::{Int16Array, UInt8Array};

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("narrow.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new(columns::VELOCITY, DataType::Int16, false),
            Field::new(columns::BANDWIDTH_DL, DataType::UInt8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int16Array::from(vec![30, 40])),
                Arc::new(UInt8Array::from(vec![Some(20), None])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let mut rec = load_file(&path).unwrap();
        assert_eq!(rec.value(0, columns::VELOCITY), &CellValue::Float(30.0));
        assert_eq!(rec.value(0, columns::BANDWIDTH_DL).as_f64(), Some(20.0));
        assert!(rec.value(1, columns::BANDWIDTH_DL).is_null());

        let removed = crate::data::filter::MobilityFilter::MovingOnly
            .apply(&mut rec)
            .unwrap();
        assert_eq!(removed, 0);
        assert_eq!(rec.len(), 2);
    }

    #[test]
    fn unsupported_arrow_types_read_as_missing() {
        use arrow::array::Date32Array;

        let array: ArrayRef = Arc::new(Date32Array::from(vec![19_000]));
        assert_eq!(extract_cell(&widen_numeric(&array), 0), CellValue::Null);
    }

    #[test]
    fn collection_keeps_descriptor_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.csv", "Velocity\n1\n2\n");
        write(dir.path(), "b.csv", "Velocity\n3\n");
        let list = list_available(dir.path().to_str().unwrap()).unwrap();
        let coll = load_collection(&list).unwrap();
        let sizes: Vec<_> = coll.records.iter().map(TraceRecord::len).collect();
        assert_eq!(sizes, vec![2, 1]);
    }
}
