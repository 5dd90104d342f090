//! Error types for model evaluation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building the design matrix, fitting or persisting.
#[derive(Debug, Error)]
pub enum EvaluateError {
    /// The target column is not in the table.
    #[error("target column '{column}' not found")]
    MissingTarget { column: String },

    /// A feature or target column is not numeric.
    #[error("column '{column}' is not numeric ({dtype})")]
    NonNumeric { column: String, dtype: String },

    /// A feature or target column has missing values.
    #[error("column '{column}' has {count} null value(s)")]
    NullValues { column: String, count: usize },

    /// Nothing left to regress on.
    #[error("no feature columns besides the target")]
    NoFeatures,

    /// Too few rows for the requested split.
    #[error("{context}: {rows} row(s), at least {needed} required")]
    TooFewRows {
        context: &'static str,
        rows: usize,
        needed: usize,
    },

    /// An option is outside its valid range.
    #[error("invalid option {name}: {message}")]
    InvalidOption { name: &'static str, message: String },

    /// The least-squares fit failed.
    #[error("linear regression fit failed: {message}")]
    Fit { message: String },

    /// A metric could not be computed.
    #[error("metric computation failed: {message}")]
    Metric { message: String },

    /// Failed to read or write a model artifact.
    #[error("failed to access artifact {path}: {source}")]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact JSON could not be produced or parsed.
    #[error("invalid artifact {path}: {source}")]
    ArtifactFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for EvaluateError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

impl From<linfa::Error> for EvaluateError {
    fn from(err: linfa::Error) -> Self {
        Self::Metric {
            message: err.to_string(),
        }
    }
}

/// Result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvaluateError>;
