//! Small helpers shared across CLI tests.

use std::path::Path;

use clap::Parser;

use super::commands::run_command;
use super::{Cli, CliError, Command, ExecutionSummary, RunCommand};

pub(super) fn arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are UTF-8")
}

/// Parses `trailhac run <args>` the way the binary does.
pub(super) fn parse_run(args: &[&str]) -> RunCommand {
    let argv = ["trailhac", "run"].into_iter().chain(args.iter().copied());
    match Cli::try_parse_from(argv) {
        Ok(Cli {
            command: Command::Run(run),
        }) => run,
        Err(err) => panic!("arguments must parse: {err}"),
    }
}

pub(super) fn run_ok(args: &[&str]) -> ExecutionSummary {
    match run_command(parse_run(args)) {
        Ok(summary) => summary,
        Err(err) => panic!("run must succeed: {err}"),
    }
}

pub(super) fn run_err(args: &[&str]) -> CliError {
    match run_command(parse_run(args)) {
        Ok(_) => panic!("run must fail"),
        Err(err) => err,
    }
}
