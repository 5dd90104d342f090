//! ICD-9 diagnosis code classification.
//!
//! Letter-prefixed codes are routed through the numeric range table via
//! fractional sentinels below 1.0: `V` → 0.1, `E` → 0.5, `M` → 0.8. Numeric
//! codes keep their first three digits, so `"4139"` becomes 413.0.

use std::fmt;
use std::ops::{Bound, RangeBounds};

use los_model::DiagnosisGroup;
use los_model::Stage;
use los_model::columns::{DIAGNOSES, ICD9_CODE};
use polars::prelude::*;
use thiserror::Error;

use crate::error::{DiagnosisFailure, Result, TransformError};
use crate::frame::{locate_row, require_columns};

const SUPPLEMENTAL_SENTINEL: f64 = 0.1;
const EXTERNAL_SENTINEL: f64 = 0.5;
const MORPHOLOGY_SENTINEL: f64 = 0.8;

/// Why a code could not be classified.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodeError {
    #[error("empty code")]
    Empty,
    #[error("unknown prefix '{prefix}'")]
    UnknownPrefix { prefix: char },
    #[error("not a numeric code")]
    NotNumeric,
    #[error("value {value} is outside every diagnosis range")]
    OutOfRange { value: f64 },
}

/// A code-value interval and the group it maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeRange {
    pub lower: Bound<f64>,
    pub upper: Bound<f64>,
    pub group: DiagnosisGroup,
}

impl CodeRange {
    const fn inclusive(lower: f64, upper: f64, group: DiagnosisGroup) -> Self {
        Self {
            lower: Bound::Included(lower),
            upper: Bound::Included(upper),
            group,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.lower, self.upper).contains(&value)
    }
}

impl fmt::Display for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lower {
            Bound::Included(v) => write!(f, "[{v}")?,
            Bound::Excluded(v) => write!(f, "({v}")?,
            Bound::Unbounded => f.write_str("(-inf")?,
        }
        match self.upper {
            Bound::Included(v) => write!(f, ", {v}]"),
            Bound::Excluded(v) => write!(f, ", {v})"),
            Bound::Unbounded => f.write_str(", inf)"),
        }
    }
}

/// Ordered, non-overlapping ranges covering every group exactly once.
pub const DIAGNOSIS_RANGES: [CodeRange; 20] = [
    CodeRange::inclusive(1.0, 139.0, DiagnosisGroup::ParasiticDisease),
    CodeRange::inclusive(140.0, 239.0, DiagnosisGroup::Neoplasm),
    CodeRange::inclusive(240.0, 279.0, DiagnosisGroup::Endocrine),
    CodeRange::inclusive(280.0, 289.0, DiagnosisGroup::Blood),
    CodeRange::inclusive(290.0, 319.0, DiagnosisGroup::MentalDisorder),
    CodeRange::inclusive(320.0, 389.0, DiagnosisGroup::NervousSystem),
    CodeRange::inclusive(390.0, 459.0, DiagnosisGroup::CirculatorySystem),
    CodeRange::inclusive(460.0, 519.0, DiagnosisGroup::RespiratorySystem),
    CodeRange::inclusive(520.0, 579.0, DiagnosisGroup::DigestiveSystem),
    CodeRange::inclusive(580.0, 629.0, DiagnosisGroup::GenitourinarySystem),
    CodeRange::inclusive(630.0, 679.0, DiagnosisGroup::Pregnancy),
    CodeRange::inclusive(680.0, 709.0, DiagnosisGroup::Skin),
    CodeRange::inclusive(710.0, 739.0, DiagnosisGroup::Musculoskeletal),
    CodeRange::inclusive(740.0, 759.0, DiagnosisGroup::CongenitalAnomalies),
    CodeRange::inclusive(760.0, 779.0, DiagnosisGroup::Perinatal),
    CodeRange::inclusive(780.0, 799.0, DiagnosisGroup::IllDefined),
    CodeRange::inclusive(800.0, 999.0, DiagnosisGroup::InjuryPoison),
    // Open at 0.0: a numeric code truncating to `000` is out of range rather
    // than a supplemental factor.
    CodeRange {
        lower: Bound::Excluded(0.0),
        upper: Bound::Excluded(0.4),
        group: DiagnosisGroup::SupplementalFactors,
    },
    CodeRange {
        lower: Bound::Included(0.4),
        upper: Bound::Excluded(0.7),
        group: DiagnosisGroup::ExternalCauseInjPoison,
    },
    CodeRange {
        lower: Bound::Included(0.7),
        upper: Bound::Excluded(0.9),
        group: DiagnosisGroup::MorphologyOfNeoplasms,
    },
];

/// Maps a raw code to the value looked up in [`DIAGNOSIS_RANGES`].
pub fn code_value(code: &str) -> std::result::Result<f64, CodeError> {
    let code = code.trim();
    let first = code.chars().next().ok_or(CodeError::Empty)?;
    if first.is_ascii_alphabetic() {
        return match first.to_ascii_uppercase() {
            'V' => Ok(SUPPLEMENTAL_SENTINEL),
            'E' => Ok(EXTERNAL_SENTINEL),
            'M' => Ok(MORPHOLOGY_SENTINEL),
            prefix => Err(CodeError::UnknownPrefix { prefix }),
        };
    }
    let head: String = code.chars().take(3).collect();
    if !head.chars().all(|c| c.is_ascii_digit()) {
        return Err(CodeError::NotNumeric);
    }
    head.parse::<f64>().map_err(|_| CodeError::NotNumeric)
}

/// Classifies one raw ICD-9 code.
///
/// ```
/// use los_model::DiagnosisGroup;
/// use los_transform::classify_code;
///
/// assert_eq!(classify_code("4139"), Ok(DiagnosisGroup::CirculatorySystem));
/// assert_eq!(classify_code("V3000"), Ok(DiagnosisGroup::SupplementalFactors));
/// assert!(classify_code("000").is_err());
/// ```
pub fn classify_code(code: &str) -> std::result::Result<DiagnosisGroup, CodeError> {
    let value = code_value(code)?;
    DIAGNOSIS_RANGES
        .iter()
        .find(|range| range.contains(value))
        .map(|range| range.group)
        .ok_or(CodeError::OutOfRange { value })
}

/// Replaces `icd9_code` with a `diagnoses` column of group labels, in place
/// of the original column.
///
/// Every failing row is collected; if any fail the whole table is rejected
/// with [`TransformError::Diagnosis`]. Null codes stay null.
pub fn classify_diagnoses(df: DataFrame) -> Result<DataFrame> {
    require_columns(&df, Stage::DiagnosisClassification, &[ICD9_CODE])?;

    let codes = df.column(ICD9_CODE)?.str()?;
    let mut labels: Vec<Option<&'static str>> = Vec::with_capacity(codes.len());
    let mut failures = Vec::new();

    for (row, code) in codes.into_iter().enumerate() {
        let Some(code) = code else {
            labels.push(None);
            continue;
        };
        match classify_code(code) {
            Ok(group) => labels.push(Some(group.label())),
            Err(reason) => {
                failures.push(DiagnosisFailure {
                    at: locate_row(&df, row),
                    code: code.to_string(),
                    reason,
                });
                labels.push(None);
            }
        }
    }

    if !failures.is_empty() {
        return Err(TransformError::Diagnosis { failures });
    }

    let index = df
        .get_column_index(ICD9_CODE)
        .ok_or_else(|| TransformError::MissingColumn {
            stage: Stage::DiagnosisClassification,
            column: ICD9_CODE.to_string(),
        })?;
    let mut df = df;
    df.replace_column(index, Series::new(DIAGNOSES.into(), labels))?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn numeric_codes_truncate_to_three_digits() {
        assert_eq!(code_value("4139"), Ok(413.0));
        assert_eq!(code_value("0389"), Ok(38.0));
        assert_eq!(code_value("42"), Ok(42.0));
        assert_eq!(classify_code("0389"), Ok(DiagnosisGroup::ParasiticDisease));
        assert_eq!(classify_code("99999"), Ok(DiagnosisGroup::InjuryPoison));
        assert_eq!(classify_code("7999"), Ok(DiagnosisGroup::IllDefined));
    }

    #[test]
    fn sentinels_are_case_insensitive() {
        assert_eq!(classify_code("e8497"), Ok(DiagnosisGroup::ExternalCauseInjPoison));
        assert_eq!(classify_code("M8000"), Ok(DiagnosisGroup::MorphologyOfNeoplasms));
        assert_eq!(classify_code(" v3001 "), Ok(DiagnosisGroup::SupplementalFactors));
    }

    #[test]
    fn invalid_codes_are_errors() {
        assert_eq!(classify_code(""), Err(CodeError::Empty));
        assert_eq!(classify_code("   "), Err(CodeError::Empty));
        assert_eq!(
            classify_code("X123"),
            Err(CodeError::UnknownPrefix { prefix: 'X' })
        );
        assert_eq!(classify_code("4.1"), Err(CodeError::NotNumeric));
        assert_eq!(
            classify_code("0001"),
            Err(CodeError::OutOfRange { value: 0.0 })
        );
    }

    #[test]
    fn every_group_has_exactly_one_range() {
        for group in DiagnosisGroup::ALL {
            let count = DIAGNOSIS_RANGES.iter().filter(|r| r.group == group).count();
            assert_eq!(count, 1, "{group}");
        }
    }

    #[test]
    fn ranges_render_with_bounds() {
        assert_eq!(DIAGNOSIS_RANGES[6].to_string(), "[390, 459]");
        assert_eq!(DIAGNOSIS_RANGES[17].to_string(), "(0, 0.4)");
        assert_eq!(DIAGNOSIS_RANGES[18].to_string(), "[0.4, 0.7)");
    }

    #[test]
    fn column_is_replaced_in_position() {
        let df = df!(
            "subject_id" => [1i64, 1],
            "icd9_code" => ["4139", "V3000"],
            "gender" => ["M", "M"],
        )
        .unwrap();
        let out = classify_diagnoses(df).unwrap();
        let names: Vec<&str> = out.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["subject_id", "diagnoses", "gender"]);
        let labels = out.column(DIAGNOSES).unwrap().str().unwrap();
        assert_eq!(labels.get(0), Some("Circulatory_System"));
        assert_eq!(labels.get(1), Some("Supplemental_factors"));
    }

    #[test]
    fn every_failing_row_is_reported() {
        let df = df!(
            "subject_id" => [1i64, 2, 3],
            "hadm_id" => [10i64, 20, 30],
            "icd9_code" => ["000", "4139", "Q12"],
        )
        .unwrap();
        let err = classify_diagnoses(df).unwrap_err();
        let TransformError::Diagnosis { failures } = err else {
            panic!("expected diagnosis error, got {err}");
        };
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].at.row, 0);
        assert_eq!(failures[0].at.hadm_id, Some(10));
        assert_eq!(failures[1].code, "Q12");
        assert_eq!(failures[1].reason, CodeError::UnknownPrefix { prefix: 'Q' });
    }

    proptest! {
        #[test]
        fn valid_codes_always_classify(code in "([1-9][0-9]{2,4}|0[1-9][0-9]{1,3}|[VEMvem][0-9]{0,4})") {
            let group = classify_code(&code);
            prop_assert!(group.is_ok());
            prop_assert_eq!(group, classify_code(&code));
        }

        #[test]
        fn classification_is_deterministic(code in "\\PC{0,8}") {
            prop_assert_eq!(classify_code(&code), classify_code(&code));
        }
    }
}
