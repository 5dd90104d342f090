//! Pipeline driver: runs every stage in order and accounts for each.

use std::time::Instant;

use los_model::{PipelineOptions, PipelineReport, SourceTable, Stage, StageReport, UnmappedValues};
use polars::prelude::DataFrame;
use tracing::debug;

use crate::consolidate::Consolidator;
use crate::derived::{add_derived_fields, apply_age_bands};
use crate::diagnosis::classify_diagnoses;
use crate::encode::{EncodeOptions, encode_admissions};
use crate::error::Result;
use crate::filter::{exclude_deaths, isolate_first_visits, remove_incomplete_rows};
use crate::frame::count_subjects;
use crate::merge::{SourceFrames, merge_sources};
use crate::reporter::StageReporter;

/// Result of [`prepare`].
#[derive(Debug, Clone)]
pub struct Prepared {
    /// One row per admission, ready for the evaluator.
    pub features: DataFrame,
    pub report: PipelineReport,
}

struct StageRunner<'a> {
    reporter: &'a dyn StageReporter,
    report: PipelineReport,
}

impl StageRunner<'_> {
    fn run<F>(&mut self, stage: Stage, input: DataFrame, transform: F) -> Result<DataFrame>
    where
        F: FnOnce(DataFrame) -> Result<DataFrame>,
    {
        self.reporter.stage_started(stage);
        let rows_in = input.height();
        let subjects_in = count_subjects(&input)?;
        let started = Instant::now();
        let output = transform(input)?;
        self.finish(stage, rows_in, subjects_in, &output, started)?;
        Ok(output)
    }

    fn finish(
        &mut self,
        stage: Stage,
        rows_in: usize,
        subjects_in: usize,
        output: &DataFrame,
        started: Instant,
    ) -> Result<()> {
        let report = StageReport {
            stage,
            rows_in,
            rows_out: output.height(),
            subjects_in,
            subjects_out: count_subjects(output)?,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        self.reporter.stage_finished(&report);
        self.report.stages.push(report);
        Ok(())
    }
}

/// Runs merge, mortality exclusion, first-visit isolation, null removal,
/// derived fields, consolidation, diagnosis classification and encoding.
///
/// Each stage takes ownership of the previous stage's table. Merge counts
/// its input from the admissions table.
pub fn prepare(
    sources: SourceFrames,
    options: &PipelineOptions,
    reporter: &dyn StageReporter,
) -> Result<Prepared> {
    let mut runner = StageRunner {
        reporter,
        report: PipelineReport::default(),
    };

    reporter.stage_started(Stage::Merge);
    let (rows_in, subjects_in) = match sources.get(&SourceTable::Admissions) {
        Some(admissions) => (admissions.height(), count_subjects(admissions)?),
        None => (0, 0),
    };
    let started = Instant::now();
    let merged = merge_sources(sources, &options.extra_columns)?;
    runner.finish(Stage::Merge, rows_in, subjects_in, &merged, started)?;

    let survivors = runner.run(Stage::MortalityExclusion, merged, exclude_deaths)?;
    let first = runner.run(Stage::FirstVisit, survivors, |df| {
        isolate_first_visits(df, &options.first_visit_keys)
    })?;
    let complete = runner.run(Stage::NullRemoval, first, remove_incomplete_rows)?;
    let derived = runner.run(Stage::DerivedFields, complete, |df| {
        let df = add_derived_fields(df, options.max_age)?;
        if options.age_bands {
            apply_age_bands(df)
        } else {
            Ok(df)
        }
    })?;

    let mut unmapped = UnmappedValues::new();
    let consolidated = runner.run(Stage::Consolidation, derived, |df| {
        let out = Consolidator::default().apply(df, options.unmapped_policy)?;
        unmapped = out.unmapped;
        Ok(out.frame)
    })?;
    for (column, values) in &unmapped {
        for (value, count) in values {
            reporter.unmapped_value(column, value, *count);
            runner.report.record_unmapped(column, value, *count);
        }
    }

    let classified = runner.run(
        Stage::DiagnosisClassification,
        consolidated,
        classify_diagnoses,
    )?;
    let encode = EncodeOptions {
        keep_admission_id: options.keep_admission_id,
        count_diagnoses: options.count_diagnoses,
    };
    let features = runner.run(Stage::Encoding, classified, |df| {
        encode_admissions(df, &encode)
    })?;

    debug!(
        rows = features.height(),
        columns = features.width(),
        unmapped = runner.report.unmapped_count(),
        "pipeline finished"
    );
    Ok(Prepared {
        features,
        report: runner.report,
    })
}
