//! Fitted model persistence.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EvaluateError, Result};
use crate::evaluate::Metrics;

/// Scores on the training and held-out partitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldoutMetrics {
    pub train: Metrics,
    pub test: Metrics,
}

/// A fitted linear model: `target = intercept + sum(coefficient * feature)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub target: String,
    pub intercept: f64,
    pub coefficients: BTreeMap<String, f64>,
    pub metrics: HoldoutMetrics,
}

/// Writes `artifact` as pretty JSON, creating parent directories.
pub fn save_artifact(artifact: &ModelArtifact, path: &Path) -> Result<()> {
    let io_error = |source| EvaluateError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let json = serde_json::to_string_pretty(artifact).map_err(|source| {
        EvaluateError::ArtifactFormat {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, json).map_err(io_error)?;
    info!(path = %path.display(), features = artifact.coefficients.len(), "model saved");
    Ok(())
}

pub fn load_artifact(path: &Path) -> Result<ModelArtifact> {
    let text = fs::read_to_string(path).map_err(|source| EvaluateError::ArtifactIo {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| EvaluateError::ArtifactFormat {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ModelArtifact {
        let metrics = Metrics {
            r2: 0.5,
            rmse: 1.25,
            mae: 1.0,
        };
        ModelArtifact {
            target: "los".to_string(),
            intercept: 1.0,
            coefficients: BTreeMap::from([
                ("age".to_string(), 0.5),
                ("gender_M".to_string(), 2.0),
            ]),
            metrics: HoldoutMetrics {
                train: metrics,
                test: metrics,
            },
        }
    }

    #[test]
    fn saves_into_new_directory_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("los.json");
        save_artifact(&artifact(), &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"coefficients\""));
        assert_eq!(load_artifact(&path).unwrap(), artifact());
    }

    #[test]
    fn load_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(
            load_artifact(&path),
            Err(EvaluateError::ArtifactFormat { .. })
        ));
    }
}
