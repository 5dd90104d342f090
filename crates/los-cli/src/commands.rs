use anyhow::{Context, Result};
use comfy_table::{CellAlignment, Table};
use los_evaluate::{cross_validate, evaluate, save_artifact};
use los_ingest::{discover_sources, load_sources, read_feature_table, write_csv};
use los_model::{EvaluateOptions, PipelineOptions};
use los_transform::{DIAGNOSIS_RANGES, Prepared, prepare};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use los_cli::config::{RunConfig, load_config};
use los_cli::export::{write_report_json, write_unmapped_csv};
use los_cli::logging::log_data_enabled;
use los_cli::progress::ProgressReporter;

use crate::cli::{EvaluateArgs, EvaluateFlags, PrepareArgs, RunArgs};
use crate::summary::{align_column, apply_table_style, header_cell};
use crate::types::{EvaluateOutcome, PrepareOutcome};

pub fn run_groups() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Group"),
        header_cell("Code range"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for range in &DIAGNOSIS_RANGES {
        table.add_row(vec![
            range.group.label().to_string(),
            range.to_string(),
            range.group.description().to_string(),
        ]);
    }
    println!("{table}");
    println!("Letter prefixes: V -> 0.1, E -> 0.5, M -> 0.8; numeric codes use their first three digits.");
    Ok(())
}

pub fn run_prepare(args: &PrepareArgs) -> Result<PrepareOutcome> {
    let config = load_config(args.config.as_deref())?;
    let (_, outcome) = prepare_features(args, &config)?;
    Ok(outcome)
}

pub fn run_evaluate(args: &EvaluateArgs) -> Result<EvaluateOutcome> {
    let config = load_config(args.config.as_deref())?;
    let features = read_feature_table(&args.features)
        .with_context(|| format!("read feature table {}", args.features.display()))?;
    evaluate_features(&features, &args.flags, config.evaluate)
}

pub fn run_all(args: &RunArgs) -> Result<(PrepareOutcome, EvaluateOutcome)> {
    let config = load_config(args.prepare.config.as_deref())?;
    let (features, prepared) = prepare_features(&args.prepare, &config)?;
    let evaluated = evaluate_features(&features, &args.flags, config.evaluate)?;
    Ok((prepared, evaluated))
}

/// File values first, then any flag given on the command line.
fn pipeline_options(mut options: PipelineOptions, args: &PrepareArgs) -> PipelineOptions {
    if let Some(policy) = args.unmapped {
        options.unmapped_policy = policy.into();
    }
    options.keep_admission_id |= args.keep_admission_id;
    options.age_bands |= args.age_bands;
    options.count_diagnoses |= args.count_diagnoses;
    for column in &args.extra_columns {
        let column = column.trim().to_lowercase();
        if !options.extra_columns.contains(&column) {
            options.extra_columns.push(column);
        }
    }
    options
}

fn evaluate_options(mut options: EvaluateOptions, flags: &EvaluateFlags) -> EvaluateOptions {
    if let Some(folds) = flags.folds {
        options.folds = folds;
    }
    if let Some(seed) = flags.seed {
        options.seed = seed;
    }
    if let Some(fraction) = flags.test_fraction {
        options.test_fraction = fraction;
    }
    if let Some(target) = &flags.target {
        options.target.clone_from(target);
    }
    options
}

fn prepare_features(args: &PrepareArgs, config: &RunConfig) -> Result<(DataFrame, PrepareOutcome)> {
    let span = info_span!("prepare", data_dir = %args.data_dir.display());
    let _guard = span.enter();
    let options = pipeline_options(config.pipeline.clone(), args);

    let paths = discover_sources(&args.data_dir, &config.sources).context("locate source tables")?;
    let frames = load_sources(&paths, &options.extra_columns).context("load source tables")?;

    let reporter = ProgressReporter::for_terminal(log_data_enabled());
    let result = prepare(frames, &options, &reporter);
    reporter.finish();
    let Prepared {
        mut features,
        report,
    } = result.context("prepare features")?;

    write_csv(&mut features, &args.output).context("write feature table")?;
    if let Some(path) = &args.report {
        write_report_json(&report, path)?;
    }
    if let Some(path) = &args.unmapped_csv {
        write_unmapped_csv(&report.unmapped, path)?;
    }
    info!(
        output = %args.output.display(),
        rows = features.height(),
        columns = features.width(),
        "feature table written"
    );

    let outcome = PrepareOutcome {
        output: args.output.clone(),
        rows: features.height(),
        columns: features.width(),
        report,
        report_path: args.report.clone(),
        unmapped_path: args.unmapped_csv.clone(),
    };
    Ok((features, outcome))
}

fn evaluate_features(
    features: &DataFrame,
    flags: &EvaluateFlags,
    options: EvaluateOptions,
) -> Result<EvaluateOutcome> {
    let span = info_span!("evaluate", rows = features.height());
    let _guard = span.enter();
    let options = evaluate_options(options, flags);

    let evaluation = evaluate(features, &options).context("evaluate model")?;
    let cross_validation = if options.folds >= 2 {
        Some(cross_validate(features, &options).context("cross-validate model")?)
    } else {
        None
    };
    if let Some(path) = &flags.model {
        save_artifact(&evaluation.model, path).context("save model")?;
    }
    Ok(EvaluateOutcome {
        evaluation,
        cross_validation,
        model_path: flags.model.clone(),
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use los_cli::config::parse_config;
    use los_model::UnmappedPolicy;

    use super::*;
    use crate::cli::{Cli, Command};

    const CONFIG: &str = r#"
        [pipeline]
        unmapped_policy = "pass_through"
        extra_columns = ["language"]

        [evaluate]
        folds = 5
        seed = 3
        test_fraction = 0.3
    "#;

    fn run_args(args: &[&str]) -> RunArgs {
        let argv = ["los", "run", "data", "-o", "features.csv"]
            .into_iter()
            .chain(args.iter().copied());
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Run(args) => args,
            _ => unreachable!("parsed a run command"),
        }
    }

    #[test]
    fn flags_override_file_values() {
        let config = parse_config(CONFIG).unwrap();
        let args = run_args(&[
            "--unmapped",
            "reject",
            "--age-bands",
            "--extra-column",
            " LANGUAGE ",
            "--extra-column",
            "religion",
            "--seed",
            "42",
            "--folds",
            "0",
        ]);

        let pipeline = pipeline_options(config.pipeline, &args.prepare);
        assert_eq!(pipeline.unmapped_policy, UnmappedPolicy::Reject);
        assert!(pipeline.age_bands);
        assert!(!pipeline.keep_admission_id);
        assert_eq!(pipeline.extra_columns, vec!["language", "religion"]);

        let evaluate = evaluate_options(config.evaluate, &args.flags);
        assert_eq!((evaluate.seed, evaluate.folds), (42, 0));
        assert_eq!(evaluate.test_fraction, 0.3);
    }

    #[test]
    fn file_values_stand_without_flags() {
        let config = parse_config(CONFIG).unwrap();
        let args = run_args(&[]);

        let pipeline = pipeline_options(config.pipeline.clone(), &args.prepare);
        assert_eq!(pipeline, config.pipeline);

        let evaluate = evaluate_options(config.evaluate.clone(), &args.flags);
        assert_eq!(evaluate, config.evaluate);
    }
}
