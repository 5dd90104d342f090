//! Terminal progress for pipeline stages.

use indicatif::{ProgressBar, ProgressStyle};
use los_model::{Stage, StageReport};
use los_transform::{StageReporter, TracingReporter};
use tracing::Level;

use crate::logging::logs_on_stderr;

const STAGE_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}";

/// Advances a bar per finished stage and forwards events to a
/// [`TracingReporter`].
pub struct ProgressReporter {
    bar: ProgressBar,
    tracing: TracingReporter,
}

impl ProgressReporter {
    pub fn new(log_values: bool) -> Self {
        let bar = ProgressBar::new(Stage::ALL.len() as u64);
        let style = ProgressStyle::with_template(STAGE_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self::with_bar(bar, log_values)
    }

    /// Draws the bar only when stage events will not be written to stderr
    /// underneath it.
    pub fn for_terminal(log_values: bool) -> Self {
        if draws_bar(tracing::enabled!(Level::INFO), logs_on_stderr()) {
            Self::new(log_values)
        } else {
            Self::hidden(log_values)
        }
    }

    /// A reporter that draws nothing.
    pub fn hidden(log_values: bool) -> Self {
        Self::with_bar(ProgressBar::hidden(), log_values)
    }

    fn with_bar(bar: ProgressBar, log_values: bool) -> Self {
        Self {
            bar,
            tracing: TracingReporter::new(log_values),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn draws_bar(info_enabled: bool, logs_on_stderr: bool) -> bool {
    !(info_enabled && logs_on_stderr)
}

impl StageReporter for ProgressReporter {
    fn stage_started(&self, stage: Stage) {
        self.bar.set_message(stage.name());
    }

    fn stage_finished(&self, report: &StageReport) {
        self.bar.inc(1);
        self.tracing.stage_finished(report);
    }

    fn unmapped_value(&self, column: &str, value: &str, count: usize) {
        self.tracing.unmapped_value(column, value, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_once_per_finished_stage() {
        let reporter = ProgressReporter::hidden(false);
        for stage in [Stage::Merge, Stage::MortalityExclusion] {
            reporter.stage_started(stage);
            reporter.stage_finished(&StageReport {
                stage,
                rows_in: 3,
                rows_out: 2,
                subjects_in: 2,
                subjects_out: 2,
                duration_ms: 0,
            });
        }
        assert_eq!(reporter.position(), 2);
        reporter.finish();
    }

    #[test]
    fn bar_yields_to_info_logs_on_stderr() {
        assert!(!draws_bar(true, true));
        assert!(draws_bar(true, false));
        assert!(draws_bar(false, true));
    }

    #[test]
    fn verbose_run_hides_the_bar() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_writer(std::io::sink)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            assert!(ProgressReporter::for_terminal(false).is_hidden());
        });
    }
}
