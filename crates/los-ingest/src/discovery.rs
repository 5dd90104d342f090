//! Source table discovery in a data directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use los_model::SourceTable;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Resolved file path for every source table.
pub type SourcePaths = BTreeMap<SourceTable, PathBuf>;

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Locates the five source tables in `dir`.
///
/// `overrides` pins a table to an explicit file; relative paths resolve
/// against `dir`. Other tables are matched by file stem, case-insensitively,
/// in the priority order of [`SourceTable::file_stems`].
pub fn discover_sources(dir: &Path, overrides: &SourcePaths) -> Result<SourcePaths> {
    let files = list_csv_files(dir)?;
    let mut resolved = SourcePaths::new();

    for table in SourceTable::ALL {
        let path = match overrides.get(&table) {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    dir.join(path)
                };
                if !path.is_file() {
                    return Err(IngestError::FileNotFound { path });
                }
                path
            }
            None => match_stem(&files, table).ok_or_else(|| IngestError::MissingSource {
                table,
                dir: dir.to_path_buf(),
                expected: table
                    .file_stems()
                    .iter()
                    .map(|stem| format!("{stem}.csv"))
                    .collect::<Vec<_>>()
                    .join(", "),
            })?,
        };
        debug!(table = %table, path = %path.display(), "source table located");
        resolved.insert(table, path);
    }

    Ok(resolved)
}

fn match_stem(files: &[PathBuf], table: SourceTable) -> Option<PathBuf> {
    table.file_stems().iter().find_map(|stem| {
        files
            .iter()
            .find(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.eq_ignore_ascii_case(stem))
            })
            .cloned()
    })
}
