//! Command implementations and argument parsing for the trailhac CLI.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use thiserror::Error;
use tracing::{Span, field, info, instrument};
use trailhac_core::{
    CoverageMode, DEFAULT_MIN_COMMUNITY_SIZE, DistanceMatrix, ExecutionStrategy, Graph,
    HierarchyReport, LinkageMethod, NodeSet, SelectionCriterion, TrailhacBuilder, TrailhacError,
    maximal_clique_bases,
};
use trailhac_providers_dense::{DenseDistanceError, DenseDistanceProvider};
use trailhac_providers_text::{
    TextProviderError, parse_bases, parse_distance_matrix, parse_edge_list,
};

const DEFAULT_MIN_BASE_SIZE: usize = 3;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "trailhac",
    about = "Cluster graph nodes hierarchically under a closed-trail distance."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Agglomerate the bases, score every merge level and report the best.
    Run(RunCommand),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Edge list, one `u v [weight]` edge per line.
    #[arg(long)]
    pub graph: PathBuf,

    /// Node distance matrix: whitespace-separated rows, or Parquet when
    /// `--distances-column` is given.
    #[arg(long)]
    pub distances: PathBuf,

    /// Parquet column holding `FixedSizeList<Float32, N>` distance rows.
    #[arg(long)]
    pub distances_column: Option<String>,

    /// Bases, one node list per line. Maximal cliques are used when absent.
    #[arg(long)]
    pub bases: Option<PathBuf>,

    /// Smallest maximal clique kept as a base when `--bases` is absent.
    ///
    /// Pass `2` to also keep lone edges as bases, as the reference driver does.
    #[arg(long, default_value_t = DEFAULT_MIN_BASE_SIZE, conflicts_with = "bases")]
    pub min_base_size: usize,

    /// Linkage statistic used between clusters.
    #[arg(long, value_enum, default_value_t = LinkageArg::Single)]
    pub linkage: LinkageArg,

    /// Read edge weights and use them in the overlap discount and scores.
    #[arg(long)]
    pub weighted: bool,

    /// Communities smaller than this are dropped before coverage completion.
    #[arg(long, default_value_t = DEFAULT_MIN_COMMUNITY_SIZE.get())]
    pub min_community_size: usize,

    /// Merge levels below this distance are not scored.
    #[arg(long, default_value_t = 0.0)]
    pub min_merge_distance: f64,

    /// Only score levels with a community count in `lo..hi` (inclusive).
    #[arg(long, value_parser = parse_community_range)]
    pub expected_communities: Option<CommunityRange>,

    /// Neighbours that must agree before an uncovered node joins a community.
    #[arg(long, default_value_t = 1)]
    pub min_neighbour_support: usize,

    /// How uncovered nodes are placed.
    #[arg(long, value_enum, default_value_t = CoverageArg::Neighbours)]
    pub coverage: CoverageArg,

    /// Also score the partition formed by the unmerged bases.
    #[arg(long)]
    pub include_unmerged: bool,

    /// Statistic used to pick the best level.
    #[arg(long, value_enum, default_value_t = CriterionArg::OverlapModularity)]
    pub criterion: CriterionArg,

    /// Execution strategy.
    #[arg(long, value_enum, default_value_t = StrategyArg::Auto)]
    pub strategy: StrategyArg,

    /// Report format written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output: OutputFormat,
}

/// Linkage statistics exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinkageArg {
    /// Minimum cross distance.
    Single,
    /// Maximum cross distance.
    Complete,
    /// Mean cross distance.
    Average,
}

impl From<LinkageArg> for LinkageMethod {
    fn from(value: LinkageArg) -> Self {
        match value {
            LinkageArg::Single => Self::Single,
            LinkageArg::Complete => Self::Complete,
            LinkageArg::Average => Self::Average,
        }
    }
}

/// Level selection criteria exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CriterionArg {
    /// Overlapping modularity (higher is better).
    OverlapModularity,
    /// Shen et al. overlap modularity (higher is better).
    EqModularity,
    /// Belonging-coefficient modularity (higher is better).
    CaoModularity,
    /// Mean conductance (lower is better).
    Conductance,
    /// Mean normalised cut (lower is better).
    NormalizedCut,
    /// Separation index (higher is better).
    SeparationIndex,
    /// Mean overlapping silhouette (higher is better).
    Silhouette,
    /// Best-community overlapping silhouette (higher is better).
    SilhouetteMax,
}

impl From<CriterionArg> for SelectionCriterion {
    fn from(value: CriterionArg) -> Self {
        match value {
            CriterionArg::OverlapModularity => Self::OverlapModularity,
            CriterionArg::EqModularity => Self::EqModularity,
            CriterionArg::CaoModularity => Self::CaoModularity,
            CriterionArg::Conductance => Self::Conductance,
            CriterionArg::NormalizedCut => Self::NormalizedCut,
            CriterionArg::SeparationIndex => Self::SeparationIndex,
            CriterionArg::Silhouette => Self::Silhouette,
            CriterionArg::SilhouetteMax => Self::SilhouetteMax,
        }
    }
}

/// Coverage completion modes exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CoverageArg {
    /// Join the community holding most of the node's neighbours.
    Neighbours,
    /// Give every uncovered node its own community.
    Singletons,
}

impl From<CoverageArg> for CoverageMode {
    fn from(value: CoverageArg) -> Self {
        match value {
            CoverageArg::Neighbours => Self::Neighbours,
            CoverageArg::Singletons => Self::Singletons,
        }
    }
}

/// Execution strategies exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Parallel when compiled in, sequential otherwise.
    Auto,
    /// Always run on the calling thread.
    Sequential,
    /// Require the Rayon backend.
    Parallel,
}

impl From<StrategyArg> for ExecutionStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Auto => Self::Auto,
            StrategyArg::Sequential => Self::Sequential,
            StrategyArg::Parallel => Self::Parallel,
        }
    }
}

/// Report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table.
    Human,
    /// One pretty-printed JSON document.
    Json,
}

/// Inclusive community-count window parsed from `lo..hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommunityRange {
    /// Smallest accepted community count.
    pub min: usize,
    /// Largest accepted community count.
    pub max: usize,
}

/// Parses `lo..hi` into a [`CommunityRange`].
///
/// Ordering is validated by the core builder, so `5..2` parses here and is
/// rejected when the run is configured.
///
/// # Errors
/// Returns a message when the separator is missing or a bound is not an
/// unsigned integer.
///
/// # Examples
/// ```
/// use trailhac_cli::cli::{CommunityRange, parse_community_range};
///
/// assert_eq!(
///     parse_community_range("2..8"),
///     Ok(CommunityRange { min: 2, max: 8 })
/// );
/// assert!(parse_community_range("2-8").is_err());
/// ```
pub fn parse_community_range(raw: &str) -> Result<CommunityRange, String> {
    let (min, max) = raw
        .split_once("..")
        .ok_or_else(|| format!("expected `lo..hi` but found `{raw}`"))?;
    let bound = |text: &str| {
        text.trim()
            .parse::<usize>()
            .map_err(|err| format!("invalid bound `{text}`: {err}"))
    };
    Ok(CommunityRange {
        min: bound(min)?,
        max: bound(max)?,
    })
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while opening an input.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// No maximal clique reached the requested base size.
    #[error("graph has no maximal clique with at least {min_base_size} nodes")]
    NoBases {
        /// Requested minimum base size.
        min_base_size: usize,
    },
    /// Parquet distance ingestion failed.
    #[error(transparent)]
    Dense(#[from] DenseDistanceError),
    /// Text ingestion failed.
    #[error(transparent)]
    Text(#[from] TextProviderError),
    /// Core orchestration failed.
    #[error(transparent)]
    Core(#[from] TrailhacError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSummary {
    /// Name derived from the graph file.
    pub graph: String,
    /// Nodes in the graph.
    pub nodes: usize,
    /// Edges in the graph.
    pub edges: usize,
    /// Bases handed to the agglomeration engine.
    pub bases: usize,
    /// Per-level table, skipped levels and best level.
    pub report: HierarchyReport,
}

impl Command {
    /// Returns the report format requested for this command.
    #[must_use]
    pub const fn output(&self) -> OutputFormat {
        match self {
            Self::Run(run) => run.output,
        }
    }
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading inputs or running the pipeline fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use tempfile::TempDir;
/// # use trailhac_cli::cli::{Cli, run_cli};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let graph = dir.path().join("edges.txt");
/// let distances = dir.path().join("distances.txt");
/// std::fs::write(&graph, "0 1\n0 2\n1 2\n1 3\n2 3\n")?;
/// std::fs::write(&distances, "0 1 1 4\n1 0 1 1\n1 1 0 1\n4 1 1 0\n")?;
/// let cli = Cli::try_parse_from([
///     "trailhac",
///     "run",
///     "--graph",
///     graph.to_str().ok_or("non-UTF-8 path")?,
///     "--distances",
///     distances.to_str().ok_or("non-UTF-8 path")?,
///     "--min-community-size",
///     "4",
/// ])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.bases, 2);
/// assert_eq!(summary.report.levels().len(), 1);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(run) => {
            Span::current().record("command", field::display("run"));
            run_command(run)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(command),
    fields(linkage = field::Empty, criterion = field::Empty, bases = field::Empty),
)]
pub(super) fn run_command(command: RunCommand) -> Result<ExecutionSummary, CliError> {
    let mut builder = TrailhacBuilder::new()
        .with_linkage_method(command.linkage.into())
        .with_edge_weights(command.weighted)
        .with_min_community_size(command.min_community_size)
        .with_min_merge_distance(command.min_merge_distance)
        .with_min_neighbour_support(command.min_neighbour_support)
        .with_coverage(command.coverage.into())
        .with_include_unmerged(command.include_unmerged)
        .with_criterion(command.criterion.into())
        .with_execution_strategy(command.strategy.into());
    if let Some(CommunityRange { min, max }) = command.expected_communities {
        builder = builder.with_community_window(min, max);
    }
    let trailhac = builder.build()?;

    let span = Span::current();
    span.record("linkage", field::display(trailhac.agglomeration_config().method().as_str()));
    span.record("criterion", field::display(trailhac.criterion().as_str()));

    let distances = load_distances(&command.distances, command.distances_column.as_deref())?;
    let graph = load_graph(&command.graph, distances.size(), command.weighted)?;
    let bases = match command.bases.as_deref() {
        Some(path) => parse_bases(open_reader(path)?)?,
        None => derive_bases(&graph, command.min_base_size)?,
    };
    span.record("bases", bases.len());

    let report = trailhac.run(&graph, &distances, &bases)?;
    let summary = ExecutionSummary {
        graph: derive_input_name(&command.graph),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        bases: bases.len(),
        report,
    };
    info!(
        graph = summary.graph.as_str(),
        levels = summary.report.levels().len(),
        best_level = ?summary.report.best_level().map(|level| level.level),
        "command completed"
    );
    Ok(summary)
}

#[instrument(
    name = "cli.load_distances",
    err,
    fields(path = field::Empty, format = field::Empty),
)]
pub(super) fn load_distances(
    path: &Path,
    column: Option<&str>,
) -> Result<DistanceMatrix, CliError> {
    let span = Span::current();
    span.record("path", field::display(path.display()));
    if let Some(column) = column {
        span.record("format", field::display("parquet"));
        let provider =
            DenseDistanceProvider::try_from_parquet_path(derive_input_name(path), path, column)?;
        return Ok(provider.into_distance_matrix()?);
    }
    span.record("format", field::display("text"));
    Ok(parse_distance_matrix(open_reader(path)?)?)
}

#[instrument(name = "cli.load_graph", err, fields(path = field::Empty))]
pub(super) fn load_graph(path: &Path, node_count: usize, weighted: bool) -> Result<Graph, CliError> {
    Span::current().record("path", field::display(path.display()));
    Ok(parse_edge_list(open_reader(path)?, Some(node_count), weighted)?)
}

pub(super) fn derive_bases(graph: &Graph, min_base_size: usize) -> Result<Vec<NodeSet>, CliError> {
    let bases = maximal_clique_bases(graph, min_base_size);
    if bases.is_empty() {
        return Err(CliError::NoBases { min_base_size });
    }
    info!(bases = bases.len(), min_base_size, "derived bases from maximal cliques");
    Ok(bases)
}

#[instrument(name = "cli.open_reader", err, fields(path = field::Empty))]
pub(super) fn open_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

pub(super) fn derive_input_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "input".to_owned(), ToOwned::to_owned)
}
