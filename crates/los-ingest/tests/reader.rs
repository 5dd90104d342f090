//! Integration tests for source loading and CSV output.

use std::fs;
use std::path::Path;

use polars::prelude::*;
use tempfile::TempDir;

use los_ingest::{
    IngestError, SourcePaths, discover_sources, load_sources, read_feature_table,
    read_source_table, write_csv,
};
use los_model::SourceTable;

const ADMISSIONS: &str = "\
ROW_ID, Subject_ID ,HADM_ID,ADMITTIME,DISCHTIME,DEATHTIME,ADMISSION_TYPE,ADMISSION_LOCATION,INSURANCE,LANGUAGE,RELIGION,MARITAL_STATUS,ETHNICITY
1,10,100,2150-01-05 08:00:00,2150-01-10 08:00:00,,EMERGENCY,EMERGENCY ROOM ADMIT ,Medicare,ENGL,CATHOLIC,MARRIED,WHITE
2,11,101,2151-03-01 10:00:00,2151-03-04 10:00:00,,ELECTIVE,PHYS REFERRAL/NORMAL DELI,Private,,JEWISH,SINGLE,BLACK/AFRICAN AMERICAN
";

const DIAGNOSES: &str = "\
row_id,subject_id,hadm_id,seq_num,icd9_code
1,10,100,1,0389
2,10,100,2,V3000
3,11,101,1,4139
";

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn write_all_sources(dir: &Path) {
    write(dir, "ADMISSIONS.csv", ADMISSIONS);
    write(
        dir,
        "PATIENTS.csv",
        "row_id,subject_id,gender,dob,dod\n1,10,M,2090-06-01 00:00:00,\n2,11,F,2100-01-01 00:00:00,\n",
    );
    write(dir, "DIAGNOSES_ICD.csv", DIAGNOSES);
    write(
        dir,
        "SERVICES.csv",
        "row_id,subject_id,hadm_id,transfertime,prev_service,curr_service\n1,10,100,2150-01-05 08:00:00,,MED\n",
    );
    write(
        dir,
        "ICUSTAYS.csv",
        "row_id,subject_id,hadm_id,icustay_id,first_careunit\n1,10,100,900,MICU\n",
    );
}

#[test]
fn headers_are_normalized_and_identifiers_parsed() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "admissions.csv", ADMISSIONS);

    let df = read_source_table(
        &dir.path().join("admissions.csv"),
        SourceTable::Admissions,
        &[],
    )
    .unwrap();

    let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names[0], "subject_id");
    assert_eq!(names[1], "hadm_id");
    assert!(!names.contains(&"row_id"));
    assert!(!names.contains(&"language"));
    assert_eq!(df.column("subject_id").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("hadm_id").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("deathtime").unwrap().null_count(), 2);
    assert_eq!(
        df.column("admission_location")
            .unwrap()
            .str()
            .unwrap()
            .get(0),
        Some("EMERGENCY ROOM ADMIT ")
    );
}

#[test]
fn extra_columns_are_kept_when_requested() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "admissions.csv", ADMISSIONS);

    let df = read_source_table(
        &dir.path().join("admissions.csv"),
        SourceTable::Admissions,
        &["LANGUAGE".to_string()],
    )
    .unwrap();

    let language = df.column("language").unwrap().str().unwrap();
    assert_eq!(language.get(0), Some("ENGL"));
    assert_eq!(language.get(1), None);
}

#[test]
fn diagnosis_codes_keep_leading_zeros() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "diagnoses_icd.csv", DIAGNOSES);

    let df = read_source_table(
        &dir.path().join("diagnoses_icd.csv"),
        SourceTable::Diagnoses,
        &[],
    )
    .unwrap();
    let codes = df.column("icd9_code").unwrap().str().unwrap();
    assert_eq!(codes.get(0), Some("0389"));
    assert_eq!(codes.get(1), Some("V3000"));
}

#[test]
fn invalid_identifier_reports_row() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "services.csv",
        "subject_id,hadm_id,curr_service\n10,100,MED\n11,x101,SURG\n",
    );

    let err = read_source_table(
        &dir.path().join("services.csv"),
        SourceTable::Services,
        &[],
    )
    .unwrap_err();
    match err {
        IngestError::InvalidIdentifier {
            column, row, value, ..
        } => {
            assert_eq!(column, "hadm_id");
            assert_eq!(row, 2);
            assert_eq!(value, "x101");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_contributed_column_is_an_error() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "icustays.csv",
        "subject_id,hadm_id,last_careunit\n10,100,MICU\n",
    );

    let err = read_source_table(
        &dir.path().join("icustays.csv"),
        SourceTable::IcuStays,
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "first_careunit"));
}

#[test]
fn duplicate_normalized_headers_are_rejected() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "patients.csv",
        "subject_id,GENDER,gender ,dob\n10,M,M,2090-06-01\n",
    );

    let err = read_source_table(
        &dir.path().join("patients.csv"),
        SourceTable::Patients,
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, IngestError::DuplicateColumn { .. }));
}

#[test]
fn discovers_and_loads_all_sources() {
    let dir = TempDir::new().unwrap();
    write_all_sources(dir.path());

    let paths = discover_sources(dir.path(), &SourcePaths::new()).unwrap();
    let frames = load_sources(&paths, &[]).unwrap();

    assert_eq!(frames.len(), 5);
    assert_eq!(frames[&SourceTable::Admissions].height(), 2);
    assert_eq!(frames[&SourceTable::Diagnoses].height(), 3);
    assert_eq!(frames[&SourceTable::Patients].width(), 3);
}

#[test]
fn write_then_read_feature_table() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out").join("features.csv");
    let mut df = df!(
        "los" => [5.0, 3.0],
        "age" => [60.0, 51.0],
        "gender_M" => [1i32, 0],
    )
    .unwrap();

    write_csv(&mut df, &path).unwrap();
    let back = read_feature_table(&path).unwrap();

    assert_eq!(back.shape(), (2, 3));
    assert_eq!(back.column("los").unwrap().dtype(), &DataType::Float64);
    assert_eq!(back.column("gender_M").unwrap().dtype(), &DataType::Int64);
}
