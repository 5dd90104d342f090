//! Error types for the transformation stages.

use std::fmt;

use los_model::{SourceTable, Stage};
use polars::prelude::PolarsError;
use serde::Serialize;
use thiserror::Error;

use crate::diagnosis::CodeError;

/// Position of a row in the table a stage received, with its identifiers
/// when they are available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowLocator {
    /// Zero-based row index within the stage input.
    pub row: usize,
    pub subject_id: Option<i64>,
    pub hadm_id: Option<i64>,
}

impl fmt::Display for RowLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.row)?;
        match (self.subject_id, self.hadm_id) {
            (None, None) => Ok(()),
            (subject, hadm) => write!(
                f,
                " (subject_id {}, hadm_id {})",
                display_id(subject),
                display_id(hadm)
            ),
        }
    }
}

fn display_id(id: Option<i64>) -> String {
    id.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// A diagnosis code that could not be assigned to a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosisFailure {
    pub at: RowLocator,
    pub code: String,
    #[serde(serialize_with = "serialize_display")]
    pub reason: CodeError,
}

impl fmt::Display for DiagnosisFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: code '{}': {}", self.at, self.code, self.reason)
    }
}

fn serialize_display<S: serde::Serializer>(
    value: &CodeError,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Errors raised by the transformation stages.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A source table was not supplied to the merger.
    #[error("missing source table: {table}")]
    MissingSource { table: SourceTable },

    /// A stage needs a column its input does not have.
    #[error("{stage}: required column '{column}' not found")]
    MissingColumn { stage: Stage, column: String },

    /// First-visit isolation lost or gained subjects.
    #[error(
        "subject count mismatch after first-visit isolation: expected {expected}, found {actual}"
    )]
    SubjectCountMismatch { expected: usize, actual: usize },

    /// A timestamp cell could not be parsed.
    #[error("unparseable {column} value '{value}' at {at}")]
    Timestamp {
        column: String,
        value: String,
        at: RowLocator,
    },

    /// One or more diagnosis codes fall outside every group.
    #[error("{} diagnosis code(s) could not be classified", .failures.len())]
    Diagnosis { failures: Vec<DiagnosisFailure> },

    /// Raw category values with no rule, under the reject policy.
    #[error("unmapped {column} values: {}", .values.join(", "))]
    UnmappedCategory { column: String, values: Vec<String> },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for TransformError {
    fn from(err: PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;
