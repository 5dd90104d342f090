//! Injectable progress reporting for pipeline stages.
//!
//! Stages never log progress themselves; the pipeline driver hands counts
//! to a [`StageReporter`] and the caller decides where they go.

use los_model::{Stage, StageReport};
use tracing::{info, warn};

/// Receives stage progress from [`crate::pipeline::prepare`].
pub trait StageReporter {
    fn stage_started(&self, _stage: Stage) {}

    fn stage_finished(&self, _report: &StageReport) {}

    /// Called once per distinct raw value no consolidation rule matched.
    fn unmapped_value(&self, _column: &str, _value: &str, _count: usize) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl StageReporter for NoopReporter {}

/// Emits stage progress as `tracing` events.
///
/// Raw values are patient-derived, so they are only logged when
/// `log_values` is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter {
    log_values: bool,
}

impl TracingReporter {
    pub fn new(log_values: bool) -> Self {
        Self { log_values }
    }
}

impl StageReporter for TracingReporter {
    fn stage_finished(&self, report: &StageReport) {
        info!(
            stage = %report.stage,
            rows_in = report.rows_in,
            rows_out = report.rows_out,
            subjects_in = report.subjects_in,
            subjects_out = report.subjects_out,
            duration_ms = report.duration_ms,
            "stage complete"
        );
    }

    fn unmapped_value(&self, column: &str, value: &str, count: usize) {
        let value = if self.log_values { value } else { "[REDACTED]" };
        warn!(column, value, count, "unmapped category value");
    }
}
