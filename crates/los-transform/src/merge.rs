//! Record merger: outer-joins the five source tables.

use std::collections::{BTreeMap, BTreeSet};

use los_model::SourceTable;
use los_model::columns::PROJECTED_COLUMNS;
use polars::prelude::*;
use tracing::debug;

use crate::error::{Result, TransformError};

/// Source tables keyed by table, as produced by ingestion.
pub type SourceFrames = BTreeMap<SourceTable, DataFrame>;

/// Joins admissions with patients on `subject_id`, then diagnoses, services
/// and ICU stays on (`subject_id`, `hadm_id`), all as full outer joins with
/// coalesced keys, and projects the fixed column set plus any
/// `extra_columns` that made it into the merge.
///
/// A non-key column already supplied by an earlier table is taken from that
/// table only.
pub fn merge_sources(mut frames: SourceFrames, extra_columns: &[String]) -> Result<DataFrame> {
    let mut merged: Option<LazyFrame> = None;
    let mut seen: BTreeSet<String> = BTreeSet::new();

    for table in SourceTable::ALL {
        let df = frames
            .remove(&table)
            .ok_or(TransformError::MissingSource { table })?;
        let keys = table.join_keys();

        let keep: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.as_str())
            .filter(|name| keys.contains(name) || !seen.contains(*name))
            .map(str::to_string)
            .collect();
        seen.extend(keep.iter().cloned());
        debug!(table = %table, rows = df.height(), columns = keep.len(), "merging table");

        let key_casts: Vec<Expr> = keys
            .iter()
            .map(|key| col(*key).cast(DataType::Int64))
            .collect();
        let right = df.select(keep)?.lazy().with_columns(key_casts);

        merged = Some(match merged {
            None => right,
            Some(left) => {
                let on: Vec<Expr> = keys.iter().map(|key| col(*key)).collect();
                left.join(
                    right,
                    on.clone(),
                    on,
                    JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
                )
            }
        });
    }

    let mut projection: Vec<Expr> = PROJECTED_COLUMNS.iter().map(|name| col(*name)).collect();
    for extra in extra_columns {
        if seen.contains(extra) && !PROJECTED_COLUMNS.contains(&extra.as_str()) {
            projection.push(col(extra.as_str()));
        }
    }

    let Some(merged) = merged else {
        return Err(TransformError::MissingSource {
            table: SourceTable::Admissions,
        });
    };
    Ok(merged.select(projection).collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames() -> SourceFrames {
        let mut frames = SourceFrames::new();
        frames.insert(
            SourceTable::Admissions,
            df!(
                "subject_id" => [1i64, 2],
                "hadm_id" => [10i64, 20],
                "admittime" => ["2150-01-01", "2150-02-01"],
                "dischtime" => ["2150-01-03", "2150-02-05"],
                "deathtime" => [None::<&str>, None],
                "admission_type" => ["EMERGENCY", "ELECTIVE"],
                "admission_location" => ["EMERGENCY ROOM ADMIT", "PHYS REFERRAL/NORMAL DELI"],
                "insurance" => ["Medicare", "Private"],
                "religion" => ["CATHOLIC", "JEWISH"],
                "marital_status" => ["MARRIED", "SINGLE"],
                "ethnicity" => ["WHITE", "ASIAN"],
                "language" => ["ENGL", "SPAN"],
            )
            .unwrap(),
        );
        frames.insert(
            SourceTable::Patients,
            df!(
                "subject_id" => [1i64, 2, 3],
                "gender" => ["M", "F", "F"],
                "dob" => ["2090-01-01", "2100-01-01", "2080-01-01"],
            )
            .unwrap(),
        );
        frames.insert(
            SourceTable::Diagnoses,
            df!(
                "subject_id" => [1i64, 1, 2],
                "hadm_id" => [10i64, 10, 20],
                "icd9_code" => ["4139", "V3000", "0389"],
            )
            .unwrap(),
        );
        frames.insert(
            SourceTable::Services,
            df!(
                "subject_id" => [1i64, 2],
                "hadm_id" => [10i64, 20],
                "curr_service" => ["MED", "SURG"],
            )
            .unwrap(),
        );
        frames.insert(
            SourceTable::IcuStays,
            df!(
                "subject_id" => [1i64],
                "hadm_id" => [10i64],
                "first_careunit" => ["MICU"],
            )
            .unwrap(),
        );
        frames
    }

    #[test]
    fn merges_with_outer_semantics() {
        let merged = merge_sources(frames(), &[]).unwrap();

        let names: Vec<&str> = merged
            .get_column_names()
            .iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(names, PROJECTED_COLUMNS.to_vec());
        // Two diagnosis rows for admission 10, one for 20, one patient-only row.
        assert_eq!(merged.height(), 4);
        // Admission 20 had no ICU stay, patient 3 had no admission.
        assert_eq!(merged.column("first_careunit").unwrap().null_count(), 2);
        assert_eq!(merged.column("hadm_id").unwrap().null_count(), 1);
    }

    #[test]
    fn extra_columns_follow_projection() {
        let merged = merge_sources(frames(), &["language".to_string()]).unwrap();
        assert_eq!(merged.width(), PROJECTED_COLUMNS.len() + 1);
        assert!(merged.column("language").is_ok());
    }

    #[test]
    fn missing_table_is_an_error() {
        let mut frames = frames();
        frames.remove(&SourceTable::Services);
        let err = merge_sources(frames, &[]).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingSource {
                table: SourceTable::Services
            }
        ));
    }
}
