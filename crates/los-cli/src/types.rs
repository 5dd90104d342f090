use std::path::PathBuf;

use los_evaluate::{CrossValidation, Evaluation};
use los_model::PipelineReport;

#[derive(Debug)]
pub struct PrepareOutcome {
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub report: PipelineReport,
    pub report_path: Option<PathBuf>,
    pub unmapped_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct EvaluateOutcome {
    pub evaluation: Evaluation,
    pub cross_validation: Option<CrossValidation>,
    pub model_path: Option<PathBuf>,
}
