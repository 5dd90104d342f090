//! One-hot encoding and per-admission aggregation.

use std::collections::BTreeSet;

use los_model::Stage;
use los_model::columns::{DIAGNOSES, DIAGNOSIS_COUNT, HADM_ID, SUBJECT_ID};
use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::frame::{drop_columns, require_columns, string_columns};

/// Output shape of [`encode_admissions`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Keep `hadm_id` as the first output column.
    pub keep_admission_id: bool,
    /// Add `diagnosis_count`, the number of distinct `diagnoses` labels per
    /// admission.
    pub count_diagnoses: bool,
}

/// Distinct non-null levels of a text column, in lexicographic order.
fn levels(df: &DataFrame, column: &str) -> Result<BTreeSet<String>> {
    Ok(df
        .column(column)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}

/// One-hot encodes every text column and collapses the table to one row per
/// `hadm_id`.
///
/// Each text column becomes `<column>_<level>` Int32 indicators for all but
/// its lexicographically smallest level. Rows are then grouped by `hadm_id`
/// and every remaining column is max-aggregated, so an indicator is 1 when any
/// row of the admission had that level. `subject_id` is dropped and output
/// rows are sorted by `hadm_id`.
pub fn encode_admissions(df: DataFrame, options: &EncodeOptions) -> Result<DataFrame> {
    require_columns(&df, Stage::Encoding, &[HADM_ID])?;
    if options.count_diagnoses {
        require_columns(&df, Stage::Encoding, &[DIAGNOSES])?;
    }
    let df = drop_columns(&df, &[SUBJECT_ID])?;
    let text = string_columns(&df);

    let mut indicators: Vec<Expr> = Vec::new();
    let mut aggregates: Vec<Expr> = Vec::new();
    for name in df.get_column_names() {
        let name = name.as_str();
        if name == HADM_ID {
            continue;
        }
        if !text.iter().any(|t| t == name) {
            aggregates.push(col(name).max());
            continue;
        }
        // The smallest level is the reference and gets no indicator.
        for level in levels(&df, name)?.into_iter().skip(1) {
            let alias = format!("{name}_{level}");
            indicators.push(
                col(name)
                    .eq(lit(level))
                    .cast(DataType::Int32)
                    .alias(alias.as_str()),
            );
            aggregates.push(col(alias.as_str()).max());
        }
    }
    if options.count_diagnoses {
        aggregates.push(
            col(DIAGNOSES)
                .drop_nulls()
                .n_unique()
                .cast(DataType::Int32)
                .alias(DIAGNOSIS_COUNT),
        );
    }
    debug!(
        text_columns = text.len(),
        indicators = indicators.len(),
        "encoding admissions"
    );

    let encoded = df
        .lazy()
        .with_columns(indicators)
        .group_by([col(HADM_ID)])
        .agg(aggregates)
        .sort([HADM_ID], SortMultipleOptions::default())
        .collect()?;

    if options.keep_admission_id {
        Ok(encoded)
    } else {
        drop_columns(&encoded, &[HADM_ID])
    }
}
