//! Error types for data ingestion.

use std::path::PathBuf;

use los_model::SourceTable;
use thiserror::Error;

/// Errors that can occur while discovering, reading or writing tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Directory not found or not a directory.
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Failed to read directory entries.
    #[error("failed to read directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No file in the data directory matches a source table.
    #[error("no {table} table found in {dir} (expected one of: {expected})")]
    MissingSource {
        table: SourceTable,
        dir: PathBuf,
        expected: String,
    },

    /// Failed to create or write an output file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === CSV Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Failed to serialize a table to CSV.
    #[error("failed to write CSV {path}: {message}")]
    CsvWrite { path: PathBuf, message: String },

    /// A header is blank after trimming.
    #[error("empty column name in {path}")]
    EmptyColumnName { path: PathBuf },

    /// Two headers collapse to the same name after trimming and lowercasing.
    #[error("duplicate column '{column}' in {path} after header normalization")]
    DuplicateColumn { column: String, path: PathBuf },

    /// Required column not present.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Identifier cell that is not an integer.
    #[error("invalid {column} value '{value}' in {path} at data row {row}")]
    InvalidIdentifier {
        path: PathBuf,
        column: String,
        row: usize,
        value: String,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
