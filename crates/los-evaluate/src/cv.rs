//! K-fold cross-validation on the training partition.

use std::collections::BTreeSet;

use los_model::EvaluateOptions;
use polars::prelude::DataFrame;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{EvaluateError, Result};
use crate::evaluate::{Metrics, SubsetFit, check_fraction, split_indices};
use crate::matrix::feature_matrix;

/// Per-fold scores with their mean and population standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidation {
    pub folds: Vec<Metrics>,
    pub mean: Metrics,
    pub std_dev: Metrics,
    /// Features left out of at least one fold's fit.
    pub excluded_features: BTreeSet<String>,
}

/// Splits `len` rows into `k` contiguous folds. The first
/// `len % k` folds get one extra row.
fn fold_bounds(len: usize, k: usize) -> Vec<(usize, usize)> {
    let base = len / k;
    let extra = len % k;
    let mut start = 0;
    (0..k)
        .map(|fold| {
            let size = base + usize::from(fold < extra);
            let bounds = (start, start + size);
            start += size;
            bounds
        })
        .collect()
}

fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn summarize(folds: &[Metrics]) -> (Metrics, Metrics) {
    let column = |pick: fn(&Metrics) -> f64| {
        let values: Vec<f64> = folds.iter().map(pick).collect();
        mean_and_std(&values)
    };
    let (r2, r2_sd) = column(|m| m.r2);
    let (rmse, rmse_sd) = column(|m| m.rmse);
    let (mae, mae_sd) = column(|m| m.mae);
    (
        Metrics { r2, rmse, mae },
        Metrics {
            r2: r2_sd,
            rmse: rmse_sd,
            mae: mae_sd,
        },
    )
}

/// Runs `options.folds`-fold cross-validation over the same training rows
/// [`crate::evaluate`] fits on, reshuffled with `options.fold_seed`.
pub fn cross_validate(df: &DataFrame, options: &EvaluateOptions) -> Result<CrossValidation> {
    check_fraction(options.test_fraction)?;
    if options.folds < 2 {
        return Err(EvaluateError::InvalidOption {
            name: "folds",
            message: format!("{} folds, at least 2 required", options.folds),
        });
    }
    let matrix = feature_matrix(df, &options.target)?;
    let (mut train_idx, _) = split_indices(matrix.rows(), options.test_fraction, options.seed);
    if train_idx.len() < 2 * options.folds {
        return Err(EvaluateError::TooFewRows {
            context: "cross-validation",
            rows: train_idx.len(),
            needed: 2 * options.folds,
        });
    }
    train_idx.shuffle(&mut StdRng::seed_from_u64(options.fold_seed));

    let mut folds = Vec::with_capacity(options.folds);
    let mut excluded_features = BTreeSet::new();
    for (fold, (start, end)) in fold_bounds(train_idx.len(), options.folds)
        .into_iter()
        .enumerate()
    {
        let held_out = &train_idx[start..end];
        let fitted_on: Vec<usize> = train_idx[..start]
            .iter()
            .chain(&train_idx[end..])
            .copied()
            .collect();
        let fitted = SubsetFit::on_rows(&matrix, &fitted_on)?;
        let metrics = fitted.score(&matrix, held_out)?;
        let excluded = fitted.excluded(&matrix);
        debug!(
            fold,
            rows = held_out.len(),
            r2 = metrics.r2,
            excluded = excluded.len(),
            "fold scored"
        );
        excluded_features.extend(excluded);
        folds.push(metrics);
    }

    let (mean, std_dev) = summarize(&folds);
    info!(
        folds = folds.len(),
        r2_mean = mean.r2,
        r2_std = std_dev.r2,
        rmse_mean = mean.rmse,
        "cross-validation complete"
    );
    Ok(CrossValidation {
        folds,
        mean,
        std_dev,
        excluded_features,
    })
}
