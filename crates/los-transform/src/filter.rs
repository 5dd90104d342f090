//! Row filter chain: mortality exclusion, first-visit isolation and
//! null-row removal. The three filters are order-dependent.

use los_model::Stage;
use los_model::columns::{ADMITTIME, DEATHTIME, FIRST_CAREUNIT, NOT_ADMITTED};
use polars::prelude::*;
use tracing::debug;

use crate::datetime::parse_timestamp_column;
use crate::error::{Result, TransformError};
use crate::frame::{count_subjects, drop_columns, require_columns};

const FIRST_ADMIT_KEY: &str = "__first_admit_ms";
const ADMIT_KEY: &str = "__admit_ms";

/// Drops rows with a recorded in-hospital death, then the `deathtime` column.
pub fn exclude_deaths(df: DataFrame) -> Result<DataFrame> {
    require_columns(&df, Stage::MortalityExclusion, &[DEATHTIME])?;
    let survivors = df.lazy().filter(col(DEATHTIME).is_null()).collect()?;
    drop_columns(&survivors, &[DEATHTIME])
}

/// Keeps, per group of `keys`, the rows whose admission time equals the
/// group's earliest admission time.
///
/// Rows sharing the earliest timestamp are all kept. Rows without an
/// admission time never match. `admittime` stays in the table for the
/// derived-field stage.
///
/// Fails with [`TransformError::SubjectCountMismatch`] if the number of
/// distinct subjects with an admission time changes.
pub fn isolate_first_visits(df: DataFrame, keys: &[String]) -> Result<DataFrame> {
    let mut required: Vec<&str> = vec![ADMITTIME];
    required.extend(keys.iter().map(String::as_str));
    require_columns(&df, Stage::FirstVisit, &required)?;

    // Compare parsed instants rather than strings so mixed timestamp layouts
    // still order correctly.
    let admitted: Vec<Option<i64>> = parse_timestamp_column(&df, ADMITTIME)?
        .into_iter()
        .map(|stamp| stamp.map(|s| s.and_utc().timestamp_millis()))
        .collect();
    let mut df = df;
    df.with_column(Series::new(ADMIT_KEY.into(), admitted))?;

    let expected = count_subjects(
        &df.clone()
            .lazy()
            .filter(col(ADMIT_KEY).is_not_null())
            .collect()?,
    )?;

    let partition: Vec<Expr> = keys.iter().map(|key| col(key.as_str())).collect();
    let first = df
        .lazy()
        .with_column(col(ADMIT_KEY).min().over(partition).alias(FIRST_ADMIT_KEY))
        .filter(col(ADMIT_KEY).eq(col(FIRST_ADMIT_KEY)))
        .collect()?;
    let first = drop_columns(&first, &[ADMIT_KEY, FIRST_ADMIT_KEY])?;

    let actual = count_subjects(&first)?;
    if actual != expected {
        return Err(TransformError::SubjectCountMismatch { expected, actual });
    }
    debug!(subjects = actual, rows = first.height(), "first visits isolated");
    Ok(first)
}

/// Marks admissions without an ICU stay as `not_admitted`, then drops every
/// row that still has a null in any column.
pub fn remove_incomplete_rows(df: DataFrame) -> Result<DataFrame> {
    require_columns(&df, Stage::NullRemoval, &[FIRST_CAREUNIT])?;
    Ok(df
        .lazy()
        .with_column(col(FIRST_CAREUNIT).fill_null(lit(NOT_ADMITTED)))
        .drop_nulls(None)
        .collect()?)
}
