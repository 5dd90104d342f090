//! The five raw source tables and what each contributes to the merge.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::columns::{
    ADMISSION_LOCATION, ADMISSION_TYPE, ADMITTIME, CURR_SERVICE, DEATHTIME, DISCHTIME, DOB,
    ETHNICITY, FIRST_CAREUNIT, GENDER, HADM_ID, ICD9_CODE, INSURANCE, MARITAL_STATUS, RELIGION,
    SUBJECT_ID,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTable {
    Admissions,
    Patients,
    Diagnoses,
    Services,
    IcuStays,
}

impl SourceTable {
    /// All tables in merge order.
    pub const ALL: [SourceTable; 5] = [
        SourceTable::Admissions,
        SourceTable::Patients,
        SourceTable::Diagnoses,
        SourceTable::Services,
        SourceTable::IcuStays,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SourceTable::Admissions => "admissions",
            SourceTable::Patients => "patients",
            SourceTable::Diagnoses => "diagnoses",
            SourceTable::Services => "services",
            SourceTable::IcuStays => "icustays",
        }
    }

    /// File stems recognised during discovery, matched case-insensitively.
    ///
    /// The first entry is the MIMIC-III export name; the second is the name
    /// used by the course extracts this pipeline was first run against.
    pub fn file_stems(self) -> &'static [&'static str] {
        match self {
            SourceTable::Admissions => &["admissions", "admissions_data"],
            SourceTable::Patients => &["patients", "patient_data"],
            SourceTable::Diagnoses => &["diagnoses_icd", "diagnoses_icd_data"],
            SourceTable::Services => &["services", "services_data"],
            SourceTable::IcuStays => &["icustays", "icustays_data"],
        }
    }

    /// Columns this table is joined on. Patients carry no admission id.
    pub fn join_keys(self) -> &'static [&'static str] {
        match self {
            SourceTable::Patients => &[SUBJECT_ID],
            _ => &[SUBJECT_ID, HADM_ID],
        }
    }

    /// Projection columns sourced from this table.
    pub fn contributed_columns(self) -> &'static [&'static str] {
        match self {
            SourceTable::Admissions => &[
                ADMITTIME,
                DISCHTIME,
                DEATHTIME,
                ADMISSION_TYPE,
                ADMISSION_LOCATION,
                INSURANCE,
                RELIGION,
                MARITAL_STATUS,
                ETHNICITY,
            ],
            SourceTable::Patients => &[GENDER, DOB],
            SourceTable::Diagnoses => &[ICD9_CODE],
            SourceTable::Services => &[CURR_SERVICE],
            SourceTable::IcuStays => &[FIRST_CAREUNIT],
        }
    }
}

impl fmt::Display for SourceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
