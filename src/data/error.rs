use thiserror::Error;

/// Fatal conditions raised by the processing core.
///
/// Rows whose metric cannot be derived are not errors: they carry
/// [`CellValue::Null`](super::model::CellValue::Null) and only lower the
/// valid-sample count downstream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// A record lacks a column that a stage strictly requires.
    #[error("record '{record}' has no '{column}' column")]
    SchemaViolation { record: String, column: String },

    /// Selection index outside the loaded collection.
    #[error("data-set {index} selected but only {len} data-sets are available")]
    Selection { index: usize, len: usize },

    /// A derived column was built with the wrong number of rows.
    #[error("record '{record}': column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        record: String,
        column: String,
        expected: usize,
        actual: usize,
    },
}
