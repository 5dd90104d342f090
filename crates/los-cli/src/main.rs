//! `los` command-line entry point.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use los_cli::logging::{LogConfig, LogFormat, init_logging};
use los_transform::TransformError;
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_all, run_evaluate, run_groups, run_prepare};
use crate::summary::{print_diagnosis_failures, print_evaluation_summary, print_prepare_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = match &cli.command {
        Command::Prepare(args) => run_prepare(args).map(|outcome| print_prepare_summary(&outcome)),
        Command::Evaluate(args) => {
            run_evaluate(args).map(|outcome| print_evaluation_summary(&outcome))
        }
        Command::Run(args) => run_all(args).map(|(prepared, evaluated)| {
            print_prepare_summary(&prepared);
            println!();
            print_evaluation_summary(&evaluated);
        }),
        Command::Groups => run_groups(),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            if let Some(TransformError::Diagnosis { failures }) =
                error.downcast_ref::<TransformError>()
            {
                print_diagnosis_failures(failures);
            }
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        log_data: cli.log_data,
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
