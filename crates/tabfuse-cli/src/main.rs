//! Tabular merge and transformation CLI.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tabfuse_cli::logging::{LogConfig, init_logging};

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{run_inspect, run_merge, run_transform, run_transforms};
use crate::summary::{print_merge_report, print_transform_report};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config_from_cli(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    run(cli)
}

fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Merge(args) => run_merge(&args).map(|report| {
            print_merge_report(&report);
            report.diagnostics.has_errors()
        }),
        Command::Transform(args) => run_transform(&args).map(|report| {
            // When the result went to stdout, keep stdout clean for piping.
            if report.written.is_some() {
                print_transform_report(&report);
            }
            false
        }),
        Command::Transforms => {
            run_transforms();
            Ok(false)
        }
        Command::Inspect(args) => run_inspect(&args).map(|()| false),
    };
    match result {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Derive the logging setup from the global flags.
///
/// An explicit `-v`/`-q` wins over `RUST_LOG`; otherwise the environment
/// picks the level and the flags only shape the output.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !cli.verbosity.is_present();
    config.format = cli.log_format.into();
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
