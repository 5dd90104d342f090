//! Holdout and cross-validation over a synthetic feature table.

use los_evaluate::{EvaluateError, cross_validate, evaluate, split_indices};
use los_model::EvaluateOptions;
use polars::prelude::*;

/// `los = 2 + 0.1 * age + 3 * icu` plus a deterministic wobble.
fn features(rows: usize) -> DataFrame {
    let age: Vec<f64> = (0..rows).map(|i| 20.0 + (i * 7 % 60) as f64).collect();
    let icu: Vec<i32> = (0..rows).map(|i| i32::from(i % 3 == 0)).collect();
    let constant: Vec<i32> = vec![1; rows];
    let los: Vec<f64> = (0..rows)
        .map(|i| {
            let wobble = ((i * 37 % 11) as f64 - 5.0) / 10.0;
            2.0 + 0.1 * age[i] + 3.0 * f64::from(icu[i]) + wobble
        })
        .collect();
    let hadm: Vec<i64> = (0..rows as i64).map(|i| 100 + i).collect();
    df!(
        "hadm_id" => hadm,
        "age" => age,
        "first_careunit_ICU" => icu,
        "insurance_Private" => constant,
        "los" => los,
    )
    .unwrap()
}

#[test]
fn holdout_is_reproducible_and_close_to_truth() {
    let df = features(200);
    let options = EvaluateOptions::default();
    let first = evaluate(&df, &options).unwrap();
    let second = evaluate(&df, &options).unwrap();
    assert_eq!(first, second);

    assert_eq!((first.train_rows, first.test_rows), (160, 40));
    assert_eq!(first.dropped_features, vec!["insurance_Private"]);
    let coefficients = &first.model.coefficients;
    assert_eq!(coefficients.len(), 2);
    assert!((coefficients["age"] - 0.1).abs() < 0.05);
    assert!((coefficients["first_careunit_ICU"] - 3.0).abs() < 0.5);
    assert!(first.test().r2 > 0.8);
    assert!(first.test().mae <= first.test().rmse + 1e-12);
}

#[test]
fn different_seed_changes_the_split() {
    let df = features(200);
    let a = evaluate(&df, &EvaluateOptions::default()).unwrap();
    let b = evaluate(
        &df,
        &EvaluateOptions {
            seed: 11,
            ..EvaluateOptions::default()
        },
    )
    .unwrap();
    assert_ne!(a.test(), b.test());
}

#[test]
fn cross_validation_reports_every_fold() {
    let df = features(200);
    let cv = cross_validate(&df, &EvaluateOptions::default()).unwrap();
    assert_eq!(cv.folds.len(), 10);
    assert!(cv.mean.r2 > 0.8);
    assert!(cv.std_dev.r2 >= 0.0);
    assert_eq!(cv, cross_validate(&df, &EvaluateOptions::default()).unwrap());
}

#[test]
fn cross_validation_needs_enough_rows_and_folds() {
    let df = features(20);
    assert!(matches!(
        cross_validate(&df, &EvaluateOptions::default()),
        Err(EvaluateError::TooFewRows { rows: 16, .. })
    ));
    let options = EvaluateOptions {
        folds: 1,
        ..EvaluateOptions::default()
    };
    assert!(matches!(
        cross_validate(&df, &options),
        Err(EvaluateError::InvalidOption { name: "folds", .. })
    ));
}

fn with_column(mut df: DataFrame, name: &str, values: Vec<i32>) -> DataFrame {
    df.with_column(Series::new(name.into(), values)).unwrap();
    df
}

#[test]
fn level_seen_only_in_test_rows_is_left_out_of_the_fit() {
    let rows = 60;
    let (_, test) = split_indices(rows, 0.2, EvaluateOptions::default().seed);
    let rare: Vec<i32> = (0..rows).map(|i| i32::from(i == test[0])).collect();
    let df = with_column(features(rows), "religion_RARE", rare);

    let evaluation = evaluate(&df, &EvaluateOptions::default()).unwrap();
    assert_eq!(
        evaluation.dropped_features,
        vec!["insurance_Private", "religion_RARE"]
    );
    let coefficients = &evaluation.model.coefficients;
    assert!(!coefficients.contains_key("religion_RARE"));
    assert!(coefficients.values().all(|c| c.is_finite()));
    assert!(evaluation.test().rmse.is_finite());
}

#[test]
fn duplicated_indicator_keeps_the_first_copy() {
    let df = features(200);
    let icu: Vec<i32> = df
        .column("first_careunit_ICU")
        .unwrap()
        .i32()
        .unwrap()
        .into_no_null_iter()
        .collect();
    let df = with_column(df, "first_careunit_ICU_copy", icu);

    let evaluation = evaluate(&df, &EvaluateOptions::default()).unwrap();
    assert!(
        evaluation
            .dropped_features
            .contains(&"first_careunit_ICU_copy".to_string())
    );
    assert!((evaluation.model.coefficients["first_careunit_ICU"] - 3.0).abs() < 0.5);
}

#[test]
fn fold_without_a_rare_level_still_fits() {
    let rows = 200;
    let options = EvaluateOptions::default();
    let (train, _) = split_indices(rows, options.test_fraction, options.seed);
    let rare: Vec<i32> = (0..rows).map(|i| i32::from(i == train[0])).collect();
    let df = with_column(features(rows), "religion_RARE", rare);

    let cv = cross_validate(&df, &options).unwrap();
    assert_eq!(cv.folds.len(), 10);
    assert!(cv.excluded_features.contains("religion_RARE"));
    assert!(cv.folds.iter().all(|fold| fold.rmse.is_finite()));
}
