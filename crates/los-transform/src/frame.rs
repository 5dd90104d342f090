//! Small DataFrame helpers shared by the stages.

use std::collections::HashSet;

use los_common::cell_i64;
use los_model::Stage;
use los_model::columns::{HADM_ID, SUBJECT_ID};
use polars::prelude::*;

use crate::error::{Result, RowLocator, TransformError};

/// Fails with [`TransformError::MissingColumn`] unless every column exists.
pub fn require_columns(df: &DataFrame, stage: Stage, columns: &[&str]) -> Result<()> {
    for column in columns {
        if df.column(column).is_err() {
            return Err(TransformError::MissingColumn {
                stage,
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Distinct non-null `subject_id` values; zero when the column is absent.
pub fn count_subjects(df: &DataFrame) -> Result<usize> {
    count_distinct_ids(df, SUBJECT_ID)
}

/// Distinct non-null values of an integer identifier column.
pub fn count_distinct_ids(df: &DataFrame, column: &str) -> Result<usize> {
    if !has_column(df, column) {
        return Ok(0);
    }
    let ids = df.column(column)?.cast(&DataType::Int64)?;
    let distinct: HashSet<i64> = ids.i64()?.into_iter().flatten().collect();
    Ok(distinct.len())
}

/// Returns `df` without the named columns; absent names are ignored.
pub fn drop_columns(df: &DataFrame, names: &[&str]) -> Result<DataFrame> {
    let keep: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .filter(|name| !names.contains(name))
        .map(str::to_string)
        .collect();
    Ok(df.select(keep)?)
}

/// Builds a locator for `row`, pulling identifiers when present.
pub fn locate_row(df: &DataFrame, row: usize) -> RowLocator {
    let id = |column: &str| {
        df.column(column)
            .ok()
            .and_then(|c| c.get(row).ok())
            .and_then(cell_i64)
    };
    RowLocator {
        row,
        subject_id: id(SUBJECT_ID),
        hadm_id: id(HADM_ID),
    }
}

/// Names of all `String` columns, in table order.
pub fn string_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String)
        .map(|c| c.name().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_distinct_subjects_ignoring_nulls() {
        let df = df!(
            "subject_id" => [Some(1i64), Some(1), Some(2), None],
        )
        .unwrap();
        assert_eq!(count_subjects(&df).unwrap(), 2);
    }

    #[test]
    fn drop_columns_ignores_missing() {
        let df = df!("a" => [1], "b" => [2], "c" => [3]).unwrap();
        let out = drop_columns(&df, &["b", "zzz"]).unwrap();
        let names: Vec<&str> = out.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn locate_row_reads_identifiers() {
        let df = df!(
            "subject_id" => [10i64, 11],
            "hadm_id" => [Some(100i64), None],
        )
        .unwrap();
        let at = locate_row(&df, 1);
        assert_eq!(at.subject_id, Some(11));
        assert_eq!(at.hadm_id, None);
    }

    #[test]
    fn missing_column_is_reported_with_stage() {
        let df = df!("a" => [1]).unwrap();
        let err = require_columns(&df, Stage::DerivedFields, &["a", "dob"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "derived_fields: required column 'dob' not found"
        );
    }
}
