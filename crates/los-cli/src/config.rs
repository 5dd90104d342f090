//! TOML run configuration.
//!
//! ```toml
//! [pipeline]
//! unmapped_policy = "reject"
//! extra_columns = ["language"]
//!
//! [evaluate]
//! folds = 5
//!
//! [sources]
//! admissions = "ADMISSIONS_2019.csv"
//! ```
//!
//! Every section and field is optional; command-line flags override file
//! values. Relative source paths resolve against the data directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use los_ingest::SourcePaths;
use los_model::{EvaluateOptions, PipelineOptions};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub pipeline: PipelineOptions,
    pub evaluate: EvaluateOptions,
    /// Explicit file names per source table, bypassing discovery.
    pub sources: SourcePaths,
}

pub fn parse_config(text: &str) -> Result<RunConfig> {
    toml::from_str(text).context("parse configuration")
}

/// Reads `path`, or returns the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("read configuration {}", path.display()))?;
    let config = parse_config(&text).with_context(|| format!("in {}", path.display()))?;
    debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use los_model::{SourceTable, UnmappedPolicy};

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), RunConfig::default());
        assert_eq!(load_config(None).unwrap(), RunConfig::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse_config(
            r#"
            [pipeline]
            unmapped_policy = "pass_through"
            first_visit_keys = ["subject_id", "hadm_id"]
            max_age = 90.0

            [evaluate]
            folds = 5
            seed = 3

            [sources]
            icu_stays = "icu.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.unmapped_policy, UnmappedPolicy::PassThrough);
        assert_eq!(config.pipeline.first_visit_keys.len(), 2);
        assert_eq!(config.pipeline.max_age, 90.0);
        assert!(!config.pipeline.age_bands);
        assert_eq!(config.evaluate.folds, 5);
        assert_eq!(config.evaluate.test_fraction, 0.2);
        assert_eq!(
            config.sources.get(&SourceTable::IcuStays),
            Some(&PathBuf::from("icu.csv"))
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_config("[pipeline]\nmax_agee = 3.0\n").is_err());
        assert!(parse_config("[model]\n").is_err());
    }
}
