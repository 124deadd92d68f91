//! Command-line interface orchestration for trailhac.
//!
//! The `run` command loads a graph, a distance matrix and optional bases,
//! runs the hierarchy pipeline and renders the per-level table.

mod commands;
mod render;

pub use commands::{
    Cli, CliError, Command, CommunityRange, CoverageArg, CriterionArg, ExecutionSummary,
    LinkageArg, OutputFormat, RunCommand, StrategyArg, parse_community_range, run_cli,
};
pub use render::render_summary;

#[cfg(test)]
mod test_fixtures;
#[cfg(test)]
mod test_helpers;
