use std::collections::BTreeMap;

use super::error::PipelineError;

// ---------------------------------------------------------------------------
// Well-known trace columns
// ---------------------------------------------------------------------------

/// Column names as exported by the drive-test tool.
pub mod columns {
    pub const VELOCITY: &str = "Velocity";
    pub const MAC_THROUGHPUT_DL: &str = "MAC downlink throughput";
    pub const APP_THROUGHPUT_DL: &str = "Application throughput downlink";
    /// Channel bandwidth in MHz.
    pub const BANDWIDTH_DL: &str = "Bandwidth downlink";
    /// Share of the carrier's resource blocks scheduled to the UE, in percent.
    pub const PRB_UTIL_DL: &str = "PRB utilization downlink";
    /// Spectrum effectively used by the UE, in MHz.
    pub const APP_BANDWIDTH_DL: &str = "Application bandwidth downlink";
    /// Application throughput per used Hz, in bit/s/Hz.
    pub const APP_SPECTRAL_EFFICIENCY_DL: &str = "Application spectral efficiency downlink";
    pub const APP_THROUGHPUT_DL_10: &str = "Application throughput downlink 10";
    pub const APP_THROUGHPUT_DL_15: &str = "Application throughput downlink 15";
    pub const APP_THROUGHPUT_DL_20: &str = "Application throughput downlink 20";
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of a trace
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes found in exported traces.
/// `Null` is the explicit missing-value marker.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    /// Numeric view of the cell. NaN and infinities count as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_finite() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(CellValue::Null, CellValue::Float)
    }
}

// ---------------------------------------------------------------------------
// Sample – one row of a trace
// ---------------------------------------------------------------------------

/// One time-series sample: column_name → value.
pub type Sample = BTreeMap<String, CellValue>;

static NULL_CELL: CellValue = CellValue::Null;

// ---------------------------------------------------------------------------
// TraceRecord – one drive-test capture
// ---------------------------------------------------------------------------

/// One loaded trace with its columns in the order they appeared or were derived.
#[derive(Debug, Clone, Default)]
pub struct TraceRecord {
    /// Data-set name (file stem).
    pub name: String,
    /// Ordered list of column names.
    pub column_names: Vec<String>,
    /// All samples (rows).
    pub samples: Vec<Sample>,
}

impl TraceRecord {
    /// Build a record, collecting column names in first-seen order.
    pub fn from_samples(name: impl Into<String>, samples: Vec<Sample>) -> Self {
        let mut column_names: Vec<String> = Vec::new();
        for sample in &samples {
            for col in sample.keys() {
                if !column_names.iter().any(|c| c == col) {
                    column_names.push(col.clone());
                }
            }
        }
        Self {
            name: name.into(),
            column_names,
            samples,
        }
    }

    /// Build a record with an explicit column order (e.g. a CSV header).
    pub fn with_columns(name: impl Into<String>, column_names: Vec<String>, samples: Vec<Sample>) -> Self {
        Self {
            name: name.into(),
            column_names,
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Cell at `row`; absent cells read as `Null`.
    pub fn value(&self, row: usize, column: &str) -> &CellValue {
        self.samples
            .get(row)
            .and_then(|s| s.get(column))
            .unwrap_or(&NULL_CELL)
    }

    /// Numeric view of a whole column, `None` where the cell is missing or not a number.
    pub fn numeric_column(&self, column: &str) -> Vec<Option<f64>> {
        self.samples
            .iter()
            .map(|s| s.get(column).and_then(CellValue::as_f64))
            .collect()
    }

    /// Insert or overwrite a column. `values` must hold one entry per sample.
    pub fn set_column(&mut self, column: &str, values: Vec<CellValue>) -> Result<(), PipelineError> {
        if values.len() != self.samples.len() {
            return Err(PipelineError::LengthMismatch {
                record: self.name.clone(),
                column: column.to_string(),
                expected: self.samples.len(),
                actual: values.len(),
            });
        }
        for (sample, value) in self.samples.iter_mut().zip(values) {
            sample.insert(column.to_string(), value);
        }
        if !self.has_column(column) {
            self.column_names.push(column.to_string());
        }
        Ok(())
    }

    /// Rename `from` to `to` in place, keeping the column position.
    /// Returns `false` when `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        let Some(pos) = self.column_names.iter().position(|c| c == from) else {
            return false;
        };
        self.column_names[pos] = to.to_string();
        for sample in &mut self.samples {
            if let Some(value) = sample.remove(from) {
                sample.insert(to.to_string(), value);
            }
        }
        true
    }

    /// Keep only samples matching `keep`. Returns the number of removed samples.
    pub fn retain_samples<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&Sample) -> bool,
    {
        let before = self.samples.len();
        self.samples.retain(keep);
        before - self.samples.len()
    }
}

// ---------------------------------------------------------------------------
// TraceCollection – every data-set of a library
// ---------------------------------------------------------------------------

/// Ordered records, one per discovered data-set.
#[derive(Debug, Clone, Default)]
pub struct TraceCollection {
    pub records: Vec<TraceRecord>,
}

impl TraceCollection {
    pub fn new(records: Vec<TraceRecord>) -> Self {
        Self { records }
    }

    /// The selected record as a one-element slice, or every record when `selection` is `None`.
    pub fn selected(&self, selection: Option<usize>) -> Result<&[TraceRecord], PipelineError> {
        match selection {
            None => Ok(&self.records),
            Some(index) => {
                self.check_index(index)?;
                Ok(std::slice::from_ref(&self.records[index]))
            }
        }
    }

    /// Mutable counterpart of [`TraceCollection::selected`].
    pub fn selected_mut(&mut self, selection: Option<usize>) -> Result<&mut [TraceRecord], PipelineError> {
        match selection {
            None => Ok(&mut self.records),
            Some(index) => {
                self.check_index(index)?;
                Ok(std::slice::from_mut(&mut self.records[index]))
            }
        }
    }

    fn check_index(&self, index: usize) -> Result<(), PipelineError> {
        if index >= self.records.len() {
            return Err(PipelineError::Selection {
                index,
                len: self.records.len(),
            });
        }
        Ok(())
    }
}
