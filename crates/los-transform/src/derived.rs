//! Derived fields: length of stay and age.

use los_model::Stage;
use los_model::columns::{ADMITTIME, AGE, DISCHTIME, DOB, LOS};
use polars::prelude::*;

use crate::datetime::{age_years, length_of_stay_days, parse_timestamp_column};
use crate::error::Result;
use crate::frame::{drop_columns, require_columns};

/// Adds `los` (days) and `age` (whole years), keeps rows with
/// `0 <= age < max_age`, and drops `admittime`, `dischtime` and `dob`.
///
/// Negative lengths of stay are kept. A row with a null timestamp gets null
/// derived values and is removed by the age filter.
pub fn add_derived_fields(df: DataFrame, max_age: f64) -> Result<DataFrame> {
    require_columns(&df, Stage::DerivedFields, &[ADMITTIME, DISCHTIME, DOB])?;

    let admitted = parse_timestamp_column(&df, ADMITTIME)?;
    let discharged = parse_timestamp_column(&df, DISCHTIME)?;
    let born = parse_timestamp_column(&df, DOB)?;

    let los: Vec<Option<f64>> = admitted
        .iter()
        .zip(&discharged)
        .map(|(admit, discharge)| Some(length_of_stay_days((*admit)?, (*discharge)?)))
        .collect();
    let age: Vec<Option<f64>> = admitted
        .iter()
        .zip(&born)
        .map(|(admit, dob)| Some(age_years((*admit)?, (*dob)?)))
        .collect();

    let mut df = df;
    df.with_column(Series::new(LOS.into(), los))?;
    df.with_column(Series::new(AGE.into(), age))?;

    let in_range = df
        .lazy()
        .filter(
            col(AGE)
                .gt_eq(lit(0.0))
                .and(col(AGE).lt(lit(max_age))),
        )
        .collect()?;
    drop_columns(&in_range, &[ADMITTIME, DISCHTIME, DOB])
}

/// Age band for a whole-year age. Bands are boundary-inclusive:
/// 0-3, 4-18, 19-40, 41-60 and 61 upwards.
pub fn age_band(age: f64) -> &'static str {
    if age <= 3.0 {
        "Baby"
    } else if age <= 18.0 {
        "Child/Teen"
    } else if age <= 40.0 {
        "Young_Adult"
    } else if age <= 60.0 {
        "Adult"
    } else {
        "Senior"
    }
}

/// Replaces the numeric `age` column with its band label.
pub fn apply_age_bands(df: DataFrame) -> Result<DataFrame> {
    require_columns(&df, Stage::DerivedFields, &[AGE])?;
    let bands: Vec<Option<&str>> = df
        .column(AGE)?
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .map(|age| age.map(age_band))
        .collect();
    let mut df = df;
    df.with_column(Series::new(AGE.into(), bands))?;
    Ok(df)
}
