//! Holdout evaluation: seeded shuffle, split, fit, score.

use std::collections::BTreeMap;

use linfa::Dataset;
use linfa::prelude::SingleTargetRegression;
use linfa::traits::{Fit, Predict};
use linfa_linear::{FittedLinearRegression, LinearRegression};
use los_model::EvaluateOptions;
use ndarray::{Array1, Axis};
use polars::prelude::DataFrame;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::artifact::{HoldoutMetrics, ModelArtifact};
use crate::error::{EvaluateError, Result};
use crate::matrix::{FeatureMatrix, feature_matrix, independent_columns};

/// Goodness-of-fit on one set of rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
}

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub train_rows: usize,
    pub test_rows: usize,
    /// Features left out of the fit because they are constant on the
    /// training rows or a linear combination of earlier features there.
    pub dropped_features: Vec<String>,
    pub model: ModelArtifact,
}

impl Evaluation {
    pub fn train(&self) -> Metrics {
        self.model.metrics.train
    }

    pub fn test(&self) -> Metrics {
        self.model.metrics.test
    }
}

pub(crate) fn check_fraction(test_fraction: f64) -> Result<()> {
    if test_fraction > 0.0 && test_fraction < 1.0 {
        Ok(())
    } else {
        Err(EvaluateError::InvalidOption {
            name: "test_fraction",
            message: format!("{test_fraction} is not strictly between 0 and 1"),
        })
    }
}

/// Shuffles `0..rows` with `seed` and splits off the test partition.
///
/// The test partition holds `ceil(rows * test_fraction)` rows; both
/// partitions keep the shuffled order.
pub fn split_indices(rows: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..rows).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let test_rows = ((rows as f64) * test_fraction).ceil() as usize;
    let test = indices.split_off(rows.saturating_sub(test_rows));
    (indices, test)
}

/// Least squares fitted on a subset of rows, restricted to the features that
/// are linearly independent over those rows.
pub(crate) struct SubsetFit {
    model: FittedLinearRegression<f64>,
    columns: Vec<usize>,
}

impl SubsetFit {
    pub(crate) fn on_rows(matrix: &FeatureMatrix, rows: &[usize]) -> Result<Self> {
        let (records, targets) = matrix.subset(rows);
        let columns = independent_columns(&records);
        if columns.is_empty() {
            return Err(EvaluateError::NoFeatures);
        }
        let model = LinearRegression::new()
            .fit(&Dataset::new(records.select(Axis(1), &columns), targets))
            .map_err(|err| EvaluateError::Fit {
                message: err.to_string(),
            })?;
        Ok(Self { model, columns })
    }

    pub(crate) fn score(&self, matrix: &FeatureMatrix, rows: &[usize]) -> Result<Metrics> {
        let (records, targets) = matrix.subset(rows);
        let predicted: Array1<f64> = self.model.predict(&records.select(Axis(1), &self.columns));
        Ok(Metrics {
            r2: predicted.r2(&targets)?,
            rmse: predicted.mean_squared_error(&targets)?.sqrt(),
            mae: predicted.mean_absolute_error(&targets)?,
        })
    }

    /// Features left out of this fit, in column order.
    pub(crate) fn excluded(&self, matrix: &FeatureMatrix) -> Vec<String> {
        matrix.names((0..matrix.features.len()).filter(|j| !self.columns.contains(j)))
    }

    fn coefficients(&self, matrix: &FeatureMatrix) -> BTreeMap<String, f64> {
        matrix
            .names(self.columns.iter().copied())
            .into_iter()
            .zip(self.model.params().iter().copied())
            .collect()
    }
}

/// Fits ordinary least squares on a seeded training split and scores it on
/// both partitions.
pub fn evaluate(df: &DataFrame, options: &EvaluateOptions) -> Result<Evaluation> {
    check_fraction(options.test_fraction)?;
    let matrix = feature_matrix(df, &options.target)?;

    let (train_idx, test_idx) = split_indices(matrix.rows(), options.test_fraction, options.seed);
    if train_idx.len() < 2 || test_idx.is_empty() {
        return Err(EvaluateError::TooFewRows {
            context: "train/test split",
            rows: matrix.rows(),
            needed: 3,
        });
    }

    let fitted = SubsetFit::on_rows(&matrix, &train_idx)?;
    let dropped_features = fitted.excluded(&matrix);
    if !dropped_features.is_empty() {
        warn!(features = ?dropped_features, "features constant or collinear on training rows");
    }
    let metrics = HoldoutMetrics {
        train: fitted.score(&matrix, &train_idx)?,
        test: fitted.score(&matrix, &test_idx)?,
    };
    info!(
        train_rows = train_idx.len(),
        test_rows = test_idx.len(),
        features = matrix.features.len() - dropped_features.len(),
        r2_train = metrics.train.r2,
        r2_test = metrics.test.r2,
        rmse_test = metrics.test.rmse,
        "holdout evaluation complete"
    );

    Ok(Evaluation {
        train_rows: train_idx.len(),
        test_rows: test_idx.len(),
        dropped_features,
        model: ModelArtifact {
            target: options.target.clone(),
            intercept: fitted.model.intercept(),
            coefficients: fitted.coefficients(&matrix),
            metrics,
        },
    })
}
