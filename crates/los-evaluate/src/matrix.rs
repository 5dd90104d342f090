//! Design matrix construction.

use los_model::columns::IDENTIFIER_COLUMNS;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use crate::error::{EvaluateError, Result};

/// Numeric features and target pulled out of a feature table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    /// Feature names, in column order of `records`.
    pub features: Vec<String>,
    pub records: Array2<f64>,
    pub targets: Array1<f64>,
}

impl FeatureMatrix {
    pub fn rows(&self) -> usize {
        self.records.nrows()
    }

    /// Names of the features at `columns`.
    pub fn names(&self, columns: impl IntoIterator<Item = usize>) -> Vec<String> {
        columns
            .into_iter()
            .map(|j| self.features[j].clone())
            .collect()
    }

    /// Rows at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> (Array2<f64>, Array1<f64>) {
        (
            self.records.select(Axis(0), indices),
            self.targets.select(Axis(0), indices),
        )
    }
}

/// Relative residual norm below which a column counts as a combination of
/// the intercept and the columns kept before it.
const DEPENDENCE_TOLERANCE: f64 = 1e-8;

/// Indices of the columns of `records` that stay linearly independent of the
/// intercept and of every earlier kept column, in column order.
///
/// Constant columns (including all-zero indicators) and exact duplicates are
/// left out, so the normal equations over the kept columns are non-singular.
pub fn independent_columns(records: &Array2<f64>) -> Vec<usize> {
    let rows = records.nrows() as f64;
    let mut basis: Vec<Array1<f64>> = Vec::new();
    let mut keep = Vec::new();
    for (j, column) in records.columns().into_iter().enumerate() {
        let Some(mean) = column.mean() else {
            continue;
        };
        let centered = column.mapv(|v| v - mean);
        let norm = centered.dot(&centered).sqrt();
        let scale = column.fold(0.0_f64, |acc, v| acc.max(v.abs())) * rows.sqrt();
        if norm <= DEPENDENCE_TOLERANCE * scale {
            continue;
        }

        let mut residual = centered;
        // Second pass restores orthogonality lost to rounding.
        for _ in 0..2 {
            for q in &basis {
                let projection = q.dot(&residual);
                residual.scaled_add(-projection, q);
            }
        }
        let remaining = residual.dot(&residual).sqrt();
        if remaining <= DEPENDENCE_TOLERANCE * norm {
            continue;
        }
        basis.push(residual.mapv(|v| v / remaining));
        keep.push(j);
    }
    keep
}

fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?;
    let dtype = column.dtype();
    if !(dtype.is_numeric() || dtype.is_bool()) {
        return Err(EvaluateError::NonNumeric {
            column: name.to_string(),
            dtype: dtype.to_string(),
        });
    }
    let nulls = column.null_count();
    if nulls > 0 {
        return Err(EvaluateError::NullValues {
            column: name.to_string(),
            count: nulls,
        });
    }
    Ok(column
        .cast(&DataType::Float64)?
        .f64()?
        .into_no_null_iter()
        .collect())
}

/// Splits `df` into the `target` column and every other column as a feature.
/// Identifier columns are never features.
pub fn feature_matrix(df: &DataFrame, target: &str) -> Result<FeatureMatrix> {
    if df.column(target).is_err() {
        return Err(EvaluateError::MissingTarget {
            column: target.to_string(),
        });
    }
    let targets = Array1::from(numeric_values(df, target)?);

    let features: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .filter(|name| *name != target && !IDENTIFIER_COLUMNS.contains(name))
        .map(str::to_string)
        .collect();
    if features.is_empty() {
        return Err(EvaluateError::NoFeatures);
    }

    let mut records = Array2::<f64>::zeros((df.height(), features.len()));
    for (j, name) in features.iter().enumerate() {
        let values = numeric_values(df, name)?;
        records.column_mut(j).assign(&Array1::from(values));
    }

    Ok(FeatureMatrix {
        features,
        records,
        targets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_and_identifiers_are_not_features() {
        let df = df!(
            "hadm_id" => [1i64, 2, 3],
            "gender_M" => [1i32, 0, 1],
            "age" => [40.0, 50.0, 60.0],
            "los" => [1.5, 2.0, 3.0],
        )
        .unwrap();
        let matrix = feature_matrix(&df, "los").unwrap();
        assert_eq!(matrix.features, vec!["gender_M", "age"]);
        assert_eq!(matrix.records.dim(), (3, 2));
        assert_eq!(matrix.records[[1, 1]], 50.0);
        assert_eq!(matrix.targets.to_vec(), vec![1.5, 2.0, 3.0]);
    }

    #[test]
    fn text_and_null_columns_are_rejected() {
        let df = df!("los" => [1.0, 2.0], "gender" => ["M", "F"]).unwrap();
        assert!(matches!(
            feature_matrix(&df, "los"),
            Err(EvaluateError::NonNumeric { ref column, .. }) if column == "gender"
        ));

        let df = df!("los" => [1.0, 2.0], "age" => [Some(3.0), None]).unwrap();
        assert!(matches!(
            feature_matrix(&df, "los"),
            Err(EvaluateError::NullValues { count: 1, .. })
        ));

        let df = df!("age" => [1.0]).unwrap();
        assert!(matches!(
            feature_matrix(&df, "los"),
            Err(EvaluateError::MissingTarget { .. })
        ));
    }

    #[test]
    fn constant_and_dependent_columns_are_left_out() {
        let records = ndarray::array![
            [1.0, 0.0, 2.0, 0.0, 1.0, 3.5],
            [2.0, 0.0, 4.0, 1.0, 0.0, 3.5],
            [3.0, 0.0, 6.0, 0.0, 0.0, 3.5],
            [4.0, 0.0, 8.0, 1.0, 0.0, 3.5],
        ];
        // Column 2 doubles column 0; columns 1 and 5 are constant.
        assert_eq!(independent_columns(&records), vec![0, 3, 4]);
    }

    #[test]
    fn complementary_indicators_keep_only_the_first() {
        let records = ndarray::array![[1.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 0.0]];
        assert_eq!(independent_columns(&records), vec![0]);
    }
}
