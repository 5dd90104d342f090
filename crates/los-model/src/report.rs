//! Per-stage row accounting and unmapped-value collection.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Merge,
    MortalityExclusion,
    FirstVisit,
    NullRemoval,
    DerivedFields,
    Consolidation,
    DiagnosisClassification,
    Encoding,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Merge,
        Stage::MortalityExclusion,
        Stage::FirstVisit,
        Stage::NullRemoval,
        Stage::DerivedFields,
        Stage::Consolidation,
        Stage::DiagnosisClassification,
        Stage::Encoding,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Merge => "merge",
            Stage::MortalityExclusion => "mortality_exclusion",
            Stage::FirstVisit => "first_visit",
            Stage::NullRemoval => "null_removal",
            Stage::DerivedFields => "derived_fields",
            Stage::Consolidation => "consolidation",
            Stage::DiagnosisClassification => "diagnosis_classification",
            Stage::Encoding => "encoding",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row and subject counts around one stage.
///
/// Subject counts are zero once `subject_id` has been dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub rows_in: usize,
    pub rows_out: usize,
    pub subjects_in: usize,
    pub subjects_out: usize,
    pub duration_ms: u64,
}

impl StageReport {
    pub fn rows_removed(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_out)
    }
}

/// Unmapped raw values per column with their occurrence counts.
pub type UnmappedValues = BTreeMap<String, BTreeMap<String, usize>>;

/// Everything a run reports besides the output table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub stages: Vec<StageReport>,
    pub unmapped: UnmappedValues,
}

impl PipelineReport {
    pub fn record_unmapped(&mut self, column: &str, value: &str, count: usize) {
        *self
            .unmapped
            .entry(column.to_string())
            .or_default()
            .entry(value.to_string())
            .or_default() += count;
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }

    pub fn unmapped_count(&self) -> usize {
        self.unmapped.values().map(BTreeMap::len).sum()
    }
}
