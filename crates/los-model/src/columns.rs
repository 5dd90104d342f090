//! Canonical column names.
//!
//! Source headers are trimmed and lowercased on load, so every name here is
//! lowercase.

pub const SUBJECT_ID: &str = "subject_id";
pub const HADM_ID: &str = "hadm_id";

pub const ADMITTIME: &str = "admittime";
pub const DISCHTIME: &str = "dischtime";
pub const DEATHTIME: &str = "deathtime";
pub const DOB: &str = "dob";

pub const ADMISSION_TYPE: &str = "admission_type";
pub const ADMISSION_LOCATION: &str = "admission_location";
pub const INSURANCE: &str = "insurance";
pub const RELIGION: &str = "religion";
pub const MARITAL_STATUS: &str = "marital_status";
pub const ETHNICITY: &str = "ethnicity";
pub const GENDER: &str = "gender";
pub const LANGUAGE: &str = "language";
pub const ICD9_CODE: &str = "icd9_code";
pub const CURR_SERVICE: &str = "curr_service";
pub const FIRST_CAREUNIT: &str = "first_careunit";

/// Length of stay in days.
pub const LOS: &str = "los";
/// Age at admission in whole years (or an age band label when banding is on).
pub const AGE: &str = "age";
/// Diagnosis group label that replaces `icd9_code`.
pub const DIAGNOSES: &str = "diagnoses";
/// Distinct diagnosis groups per admission, when counting is enabled.
pub const DIAGNOSIS_COUNT: &str = "diagnosis_count";

/// Care-unit value for admissions without an ICU stay.
pub const NOT_ADMITTED: &str = "not_admitted";

/// The fixed projection taken from the merged sources, in output order.
pub const PROJECTED_COLUMNS: [&str; 16] = [
    SUBJECT_ID,
    HADM_ID,
    ADMITTIME,
    DISCHTIME,
    ADMISSION_TYPE,
    ADMISSION_LOCATION,
    INSURANCE,
    RELIGION,
    MARITAL_STATUS,
    ETHNICITY,
    GENDER,
    DOB,
    DEATHTIME,
    ICD9_CODE,
    CURR_SERVICE,
    FIRST_CAREUNIT,
];

/// Identifier columns. They key rows and are never model features.
pub const IDENTIFIER_COLUMNS: [&str; 2] = [SUBJECT_ID, HADM_ID];
