//! CLI argument definitions for the `los` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use los_model::UnmappedPolicy;

#[derive(Parser)]
#[command(
    name = "los",
    version,
    about = "Length-of-stay feature pipeline - clean MIMIC admissions and fit a linear model",
    long_about = "Prepare a one-row-per-admission feature table from MIMIC-III style CSV \
                  extracts (admissions, patients, diagnoses, services, ICU stays) and \
                  evaluate an ordinary least squares length-of-stay model on it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Append logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include raw category values and codes in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the feature table from the five source CSV files.
    Prepare(PrepareArgs),

    /// Fit and score a linear model on a prepared feature table.
    Evaluate(EvaluateArgs),

    /// Prepare, then evaluate the result.
    Run(RunArgs),

    /// List the diagnosis groups and their code ranges.
    Groups,
}

#[derive(Args)]
pub struct PrepareArgs {
    /// Directory containing the source CSV files.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Where to write the feature table.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: PathBuf,

    /// TOML configuration file.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the stage report as JSON.
    #[arg(long = "report", value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Write unmapped category values as CSV.
    #[arg(long = "unmapped-csv", value_name = "FILE")]
    pub unmapped_csv: Option<PathBuf>,

    /// Keep hadm_id as the first output column.
    #[arg(long = "keep-admission-id")]
    pub keep_admission_id: bool,

    /// Replace numeric age with age bands.
    #[arg(long = "age-bands")]
    pub age_bands: bool,

    /// Add a per-admission count of distinct diagnosis groups.
    #[arg(long = "count-diagnoses")]
    pub count_diagnoses: bool,

    /// Handling of category values no rule matches.
    #[arg(long = "unmapped", value_enum)]
    pub unmapped: Option<UnmappedArg>,

    /// Carry an extra source column (for example `language`); repeatable.
    #[arg(long = "extra-column", value_name = "COLUMN")]
    pub extra_columns: Vec<String>,
}

/// Evaluation flags shared by `evaluate` and `run`.
#[derive(Args)]
pub struct EvaluateFlags {
    /// Save the fitted model as JSON.
    #[arg(long = "model", value_name = "FILE")]
    pub model: Option<PathBuf>,

    /// Cross-validation folds (0 or 1 disables cross-validation).
    #[arg(long = "folds")]
    pub folds: Option<usize>,

    /// Seed for the train/test shuffle.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Share of rows held out for testing.
    #[arg(long = "test-fraction")]
    pub test_fraction: Option<f64>,

    /// Target column.
    #[arg(long = "target")]
    pub target: Option<String>,
}

#[derive(Args)]
pub struct EvaluateArgs {
    /// Feature table written by `prepare`.
    #[arg(value_name = "FEATURES_CSV")]
    pub features: PathBuf,

    /// TOML configuration file.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub flags: EvaluateFlags,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub prepare: PrepareArgs,

    #[command(flatten)]
    pub flags: EvaluateFlags,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum UnmappedArg {
    CatchAll,
    PassThrough,
    Reject,
}

impl From<UnmappedArg> for UnmappedPolicy {
    fn from(arg: UnmappedArg) -> Self {
        match arg {
            UnmappedArg::CatchAll => UnmappedPolicy::CatchAll,
            UnmappedArg::PassThrough => UnmappedPolicy::PassThrough,
            UnmappedArg::Reject => UnmappedPolicy::Reject,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
