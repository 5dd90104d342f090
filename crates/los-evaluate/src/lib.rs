//! Linear-regression evaluation of the prepared feature table.
//!
//! - **matrix**: turn the feature table into a numeric design matrix
//! - **evaluate**: seeded train/test split, ordinary least squares, metrics
//! - **cv**: seeded k-fold cross-validation on the training portion
//! - **artifact**: fitted coefficients and metrics as JSON

pub mod artifact;
pub mod cv;
pub mod error;
pub mod evaluate;
pub mod matrix;

pub use artifact::{HoldoutMetrics, ModelArtifact, load_artifact, save_artifact};
pub use cv::{CrossValidation, cross_validate};
pub use error::{EvaluateError, Result};
pub use evaluate::{Evaluation, Metrics, evaluate, split_indices};
pub use matrix::{FeatureMatrix, feature_matrix, independent_columns};
