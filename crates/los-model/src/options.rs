//! Configuration options for a pipeline run.
//!
//! Both option structs deserialize from TOML with every field optional, so
//! an empty configuration file reproduces the defaults.

use serde::{Deserialize, Serialize};

use crate::columns::SUBJECT_ID;

/// What the consolidator does with a raw value no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedPolicy {
    /// Replace with the column's fallback label and record the raw value.
    #[default]
    CatchAll,
    /// Keep the raw value unchanged and record it.
    PassThrough,
    /// Fail the run, listing every unmapped value.
    Reject,
}

/// Options for the cleaning and feature-engineering stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineOptions {
    /// Grouping columns for first-visit isolation.
    pub first_visit_keys: Vec<String>,

    /// Handling of raw category values outside every rule table.
    pub unmapped_policy: UnmappedPolicy,

    /// Keep `hadm_id` in the encoded output.
    pub keep_admission_id: bool,

    /// Replace numeric age with age bands before encoding.
    pub age_bands: bool,

    /// Exclusive upper bound on age; older rows are dropped.
    pub max_age: f64,

    /// Add a `diagnosis_count` feature with the number of distinct
    /// diagnosis groups per admission.
    pub count_diagnoses: bool,

    /// Extra source columns carried past the fixed projection (for example
    /// `language`). They go through null removal, consolidation and encoding
    /// like any other column.
    pub extra_columns: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            first_visit_keys: vec![SUBJECT_ID.to_string()],
            unmapped_policy: UnmappedPolicy::default(),
            keep_admission_id: false,
            age_bands: false,
            max_age: 105.0,
            count_diagnoses: false,
            extra_columns: Vec::new(),
        }
    }
}

impl PipelineOptions {
    pub fn with_unmapped_policy(mut self, policy: UnmappedPolicy) -> Self {
        self.unmapped_policy = policy;
        self
    }

    pub fn with_keep_admission_id(mut self, keep: bool) -> Self {
        self.keep_admission_id = keep;
        self
    }

    pub fn with_age_bands(mut self, enable: bool) -> Self {
        self.age_bands = enable;
        self
    }

    pub fn with_extra_columns(mut self, columns: Vec<String>) -> Self {
        self.extra_columns = columns;
        self
    }
}

/// Options for the regression evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluateOptions {
    /// Target column.
    pub target: String,
    /// Share of rows held out for out-of-sample scoring.
    pub test_fraction: f64,
    /// Seed for the train/test shuffle.
    pub seed: u64,
    /// Number of cross-validation folds; 0 or 1 disables cross-validation.
    pub folds: usize,
    /// Seed for the fold shuffle.
    pub fold_seed: u64,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            target: crate::columns::LOS.to_string(),
            test_fraction: 0.2,
            seed: 10,
            folds: 10,
            fold_seed: 71,
        }
    }
}
