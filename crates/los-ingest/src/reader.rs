//! CSV reading for source and feature tables.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;

use los_common::parse_identifier;
use los_model::SourceTable;
use polars::prelude::*;
use tracing::{debug, info};

use crate::discovery::SourcePaths;
use crate::error::{IngestError, Result};

/// Loaded source tables keyed by table.
pub type SourceFrames = BTreeMap<SourceTable, DataFrame>;

/// Normalizes a raw CSV header: strips a UTF-8 BOM, trims, lowercases.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Reads one source table.
///
/// Every column is read as text so diagnosis codes such as `0389` keep their
/// leading zeros; empty cells become nulls. The result holds the table's join
/// keys (parsed to `Int64`), the projection columns it contributes, and any
/// of `extra_columns` present in the file.
pub fn read_source_table(
    path: &Path,
    table: SourceTable,
    extra_columns: &[String],
) -> Result<DataFrame> {
    let mut df = read_text_csv(path)?;
    normalize_headers(&mut df, path)?;

    let present: BTreeSet<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.as_str().to_string())
        .collect();

    let mut keep: Vec<String> = Vec::new();
    for column in table.join_keys().iter().chain(table.contributed_columns()) {
        if !present.contains(*column) {
            return Err(IngestError::MissingColumn {
                column: (*column).to_string(),
                path: path.to_path_buf(),
            });
        }
        keep.push((*column).to_string());
    }
    for extra in extra_columns {
        let extra = normalize_header(extra);
        if present.contains(&extra) && !keep.contains(&extra) {
            keep.push(extra);
        }
    }

    let mut df = df.select(keep)?;
    for key in table.join_keys() {
        parse_identifier_column(&mut df, key, path)?;
    }
    Ok(df)
}

/// Reads all five source tables.
pub fn load_sources(paths: &SourcePaths, extra_columns: &[String]) -> Result<SourceFrames> {
    let mut frames = SourceFrames::new();
    for (table, path) in paths {
        let start = Instant::now();
        let df = read_source_table(path, *table, extra_columns)?;
        info!(
            table = %table,
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            duration_ms = start.elapsed().as_millis(),
            "source table loaded"
        );
        frames.insert(*table, df);
    }
    Ok(frames)
}

/// Reads a previously written feature table with full-scan type inference.
pub fn read_feature_table(path: &Path) -> Result<DataFrame> {
    ensure_file(path)?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| csv_parse(path, &e))?
        .finish()
        .map_err(|e| csv_parse(path, &e))?;
    debug!(path = %path.display(), rows = df.height(), "feature table loaded");
    Ok(df)
}

fn read_text_csv(path: &Path) -> Result<DataFrame> {
    ensure_file(path)?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| csv_parse(path, &e))?
        .finish()
        .map_err(|e| csv_parse(path, &e))
}

fn ensure_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

fn csv_parse(path: &Path, error: &PolarsError) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

fn normalize_headers(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut seen = BTreeSet::new();
    let mut names = Vec::with_capacity(df.width());
    for raw in df.get_column_names() {
        let name = normalize_header(raw.as_str());
        if name.is_empty() {
            return Err(IngestError::EmptyColumnName {
                path: path.to_path_buf(),
            });
        }
        if !seen.insert(name.clone()) {
            return Err(IngestError::DuplicateColumn {
                column: name,
                path: path.to_path_buf(),
            });
        }
        names.push(name);
    }
    df.set_column_names(names)?;
    Ok(())
}

fn parse_identifier_column(df: &mut DataFrame, column: &str, path: &Path) -> Result<()> {
    let values = df.column(column)?.str()?;
    let mut parsed: Vec<Option<i64>> = Vec::with_capacity(values.len());
    for (idx, value) in values.into_iter().enumerate() {
        let id = match value {
            Some(raw) if !raw.trim().is_empty() => {
                Some(
                    parse_identifier(raw).ok_or_else(|| IngestError::InvalidIdentifier {
                        path: path.to_path_buf(),
                        column: column.to_string(),
                        row: idx + 1,
                        value: raw.to_string(),
                    })?,
                )
            }
            _ => None,
        };
        parsed.push(id);
    }
    df.with_column(Series::new(column.into(), parsed))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  SUBJECT_ID "), "subject_id");
        assert_eq!(normalize_header("\u{feff}Row_ID"), "row_id");
        assert_eq!(normalize_header("   "), "");
    }
}
