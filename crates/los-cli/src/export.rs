//! Side outputs of a `prepare` run: the stage report as JSON and the
//! unmapped category values as CSV.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use los_model::{PipelineReport, UnmappedValues};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct UnmappedRow<'a> {
    column: &'a str,
    value: &'a str,
    count: usize,
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    Ok(())
}

pub fn write_report_json(report: &PipelineReport, path: &Path) -> Result<()> {
    create_parent(path)?;
    let json = serde_json::to_string_pretty(report).context("serialize stage report")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "stage report written");
    Ok(())
}

/// One `column,value,count` row per unmapped value, ordered by column then value.
pub fn write_unmapped_csv(unmapped: &UnmappedValues, path: &Path) -> Result<()> {
    create_parent(path)?;
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    let mut rows = 0usize;
    for (column, values) in unmapped {
        for (value, count) in values {
            writer
                .serialize(UnmappedRow {
                    column,
                    value,
                    count: *count,
                })
                .context("write unmapped row")?;
            rows += 1;
        }
    }
    if rows == 0 {
        writer
            .write_record(["column", "value", "count"])
            .context("write unmapped header")?;
    }
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    info!(path = %path.display(), rows, "unmapped values written");
    Ok(())
}
