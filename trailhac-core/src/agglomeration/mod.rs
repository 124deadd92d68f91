//! Closed-trail agglomeration engine.
//!
//! Merges bases bottom-up into a complete binary tree. Every step picks the
//! globally closest pair of live clusters, records the merge, folds the
//! second cluster into the first and recomputes the survivor's distances to
//! every other live cluster. Distances follow the linkage statistic with the
//! clique-overlap discount.
//!
//! The loop itself is sequential. With the `parallel` feature the initial
//! matrix and the per-merge row recomputation fan out over Rayon; results are
//! written back serially so the output does not depend on scheduling.

mod cluster;
mod overlap;
mod working_matrix;

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    ClusterId,
    distance::DistanceMatrix,
    graph::{Graph, NodeSet},
    linkage::{Linkage, LinkageRecord},
};

use self::{cluster::ClusterArena, overlap::PairDistance};

pub use self::working_matrix::ClusterDistances;

const PROGRESS_INTERVAL: usize = 100;

/// Summary statistic taken over the cross-distance submatrix of two clusters.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LinkageMethod {
    /// Minimum cross distance.
    #[default]
    Single,
    /// Maximum cross distance.
    Complete,
    /// Mean cross distance.
    Average,
}

impl LinkageMethod {
    /// Returns the lowercase name used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Complete => "complete",
            Self::Average => "average",
        }
    }
}

/// Parameters of one agglomeration run.
///
/// # Examples
/// ```
/// use trailhac_core::{AgglomerationConfig, LinkageMethod};
///
/// let config = AgglomerationConfig::new(LinkageMethod::Average).with_edge_weights(true);
/// assert_eq!(config.method(), LinkageMethod::Average);
/// assert!(config.uses_edge_weights());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgglomerationConfig {
    method: LinkageMethod,
    use_edge_weights: bool,
    parallel: bool,
}

impl Default for AgglomerationConfig {
    fn default() -> Self {
        Self::new(LinkageMethod::default())
    }
}

impl AgglomerationConfig {
    /// Creates an unweighted configuration for `method`.
    ///
    /// Parallel recomputation is enabled whenever the `parallel` feature is
    /// compiled in.
    #[must_use]
    pub fn new(method: LinkageMethod) -> Self {
        Self {
            method,
            use_edge_weights: false,
            parallel: cfg!(feature = "parallel"),
        }
    }

    /// Enables or disables the weighted term of the overlap discount.
    #[must_use]
    pub fn with_edge_weights(mut self, enabled: bool) -> Self {
        self.use_edge_weights = enabled;
        self
    }

    /// Enables or disables Rayon fan-out; ignored without the `parallel`
    /// feature.
    #[must_use]
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled && cfg!(feature = "parallel");
        self
    }

    /// Returns the linkage method.
    #[rustfmt::skip]
    #[must_use]
    pub fn method(&self) -> LinkageMethod { self.method }

    /// Returns whether edge weights contribute to the overlap discount.
    #[rustfmt::skip]
    #[must_use]
    pub fn uses_edge_weights(&self) -> bool { self.use_edge_weights }

    /// Returns whether per-merge recomputation runs on Rayon.
    #[rustfmt::skip]
    #[must_use]
    pub fn is_parallel(&self) -> bool { self.parallel }
}

/// Cooperative cancellation flag checked between merges.
///
/// Clones share the same flag.
///
/// # Examples
/// ```
/// use trailhac_core::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Errors returned by the agglomeration engine.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum AgglomerationError {
    /// No bases were supplied.
    #[error("agglomeration requires at least one base")]
    EmptyBases,
    /// A base contained no nodes.
    #[error("base {base} is empty")]
    EmptyBase {
        /// Index of the empty base.
        base: usize,
    },
    /// A base referenced a node the graph does not have.
    #[error("base {base} references node {node} outside 0..{node_count}")]
    BaseNodeOutOfRange {
        /// Index of the offending base.
        base: usize,
        /// Offending node id.
        node: usize,
        /// Number of graph nodes.
        node_count: usize,
    },
    /// The distance matrix does not cover the graph's nodes.
    #[error("distance matrix has size {matrix} but the graph has {nodes} nodes")]
    MatrixSizeMismatch {
        /// Side length of the matrix.
        matrix: usize,
        /// Number of graph nodes.
        nodes: usize,
    },
    /// Cancellation was requested between merges.
    #[error("agglomeration cancelled after {completed_merges} merges")]
    Cancelled {
        /// Merges finished before the cancellation was observed.
        completed_merges: usize,
    },
    /// The working matrix had no live pair while merges remained.
    #[error("no live cluster pair remained after {completed_merges} merges")]
    NoCandidatePair {
        /// Merges finished before the matrix ran dry.
        completed_merges: usize,
    },
}

impl AgglomerationError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> AgglomerationErrorCode {
        match self {
            Self::EmptyBases => AgglomerationErrorCode::EmptyBases,
            Self::EmptyBase { .. } => AgglomerationErrorCode::EmptyBase,
            Self::BaseNodeOutOfRange { .. } => AgglomerationErrorCode::BaseNodeOutOfRange,
            Self::MatrixSizeMismatch { .. } => AgglomerationErrorCode::MatrixSizeMismatch,
            Self::Cancelled { .. } => AgglomerationErrorCode::Cancelled,
            Self::NoCandidatePair { .. } => AgglomerationErrorCode::NoCandidatePair,
        }
    }
}

/// Machine-readable error codes for [`AgglomerationError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum AgglomerationErrorCode {
    /// No bases were supplied.
    EmptyBases,
    /// A base was empty.
    EmptyBase,
    /// A base node was out of range.
    BaseNodeOutOfRange,
    /// The matrix size differs from the node count.
    MatrixSizeMismatch,
    /// The run was cancelled.
    Cancelled,
    /// The working matrix ran out of live pairs.
    NoCandidatePair,
}

impl AgglomerationErrorCode {
    /// Returns the symbolic identifier for logging and metrics surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyBases => "AGGLOMERATION_EMPTY_BASES",
            Self::EmptyBase => "AGGLOMERATION_EMPTY_BASE",
            Self::BaseNodeOutOfRange => "AGGLOMERATION_BASE_NODE_OUT_OF_RANGE",
            Self::MatrixSizeMismatch => "AGGLOMERATION_MATRIX_SIZE_MISMATCH",
            Self::Cancelled => "AGGLOMERATION_CANCELLED",
            Self::NoCandidatePair => "AGGLOMERATION_NO_CANDIDATE_PAIR",
        }
    }
}

fn validate_inputs(
    graph: &Graph,
    distances: &DistanceMatrix,
    bases: &[NodeSet],
) -> Result<(), AgglomerationError> {
    let node_count = graph.node_count();
    if distances.size() != node_count {
        return Err(AgglomerationError::MatrixSizeMismatch {
            matrix: distances.size(),
            nodes: node_count,
        });
    }
    if bases.is_empty() {
        return Err(AgglomerationError::EmptyBases);
    }
    for (base, nodes) in bases.iter().enumerate() {
        let Some(&last) = nodes.last() else {
            return Err(AgglomerationError::EmptyBase { base });
        };
        if last >= node_count {
            return Err(AgglomerationError::BaseNodeOutOfRange {
                base,
                node: last,
                node_count,
            });
        }
    }
    Ok(())
}

/// Computes the full initial cluster-to-cluster matrix for `bases`.
///
/// # Errors
/// Returns [`AgglomerationError`] when the inputs are malformed (see
/// [`agglomerate`]).
///
/// # Examples
/// ```
/// use trailhac_core::{AgglomerationConfig, DistanceMatrix, Graph, NodeSet, initial_distances};
///
/// let graph = Graph::try_new(3, [(0, 1), (1, 2)])?;
/// let matrix = DistanceMatrix::try_from_rows(vec![
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 0.0, 1.0],
///     vec![2.0, 1.0, 0.0],
/// ])?;
/// let bases: Vec<NodeSet> = vec![[0, 1].into(), [1, 2].into()];
/// let working = initial_distances(&graph, &matrix, &bases, AgglomerationConfig::default())?;
/// assert_eq!(working.get(0, 1), Some(1.0));
/// assert!(working.is_symmetric());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn initial_distances(
    graph: &Graph,
    distances: &DistanceMatrix,
    bases: &[NodeSet],
    config: AgglomerationConfig,
) -> Result<ClusterDistances, AgglomerationError> {
    validate_inputs(graph, distances, bases)?;
    let arena = ClusterArena::from_bases(graph, bases);
    let rule = PairDistance::new(graph, distances, config.method, config.use_edge_weights);
    Ok(fill_initial(&arena, &rule, config.parallel))
}

#[cfg(feature = "parallel")]
fn map_slots<T: Send>(
    slots: Vec<usize>,
    parallel: bool,
    f: impl Fn(usize) -> T + Send + Sync,
) -> Vec<T> {
    if parallel {
        slots.into_par_iter().map(f).collect()
    } else {
        slots.into_iter().map(f).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn map_slots<T>(slots: Vec<usize>, _parallel: bool, f: impl Fn(usize) -> T) -> Vec<T> {
    slots.into_iter().map(f).collect()
}

fn fill_initial(arena: &ClusterArena, rule: &PairDistance<'_>, parallel: bool) -> ClusterDistances {
    let size = arena.len();
    let rows = map_slots((0..size).collect(), parallel, |row| {
        (row + 1..size)
            .map(|col| (col, rule.between(arena.get(row), arena.get(col))))
            .collect::<Vec<_>>()
    });
    let mut working = ClusterDistances::new(size);
    for (row, values) in rows.into_iter().enumerate() {
        for (col, value) in values {
            working.set_symmetric(row, col, value);
        }
    }
    working
}

fn recompute_row(
    arena: &ClusterArena,
    rule: &PairDistance<'_>,
    survivor: usize,
    parallel: bool,
) -> Vec<(usize, f64)> {
    let targets = arena.alive_slots().filter(|&slot| slot != survivor).collect();
    map_slots(targets, parallel, |target| {
        (target, rule.between(arena.get(survivor), arena.get(target)))
    })
}

/// Runs the agglomeration to completion.
///
/// Produces exactly `bases.len() - 1` records. Record `k` merges the closest
/// live pair `(m1, m2)` with `m1 < m2` (first minimum in row-major order),
/// reports the pair's public ids, and assigns id `bases.len() + k` to the
/// surviving slot `m1`.
///
/// # Errors
/// Returns [`AgglomerationError::MatrixSizeMismatch`] when the matrix does not
/// match the graph, [`AgglomerationError::EmptyBases`] for an empty base list,
/// and [`AgglomerationError::EmptyBase`] or
/// [`AgglomerationError::BaseNodeOutOfRange`] for malformed bases. All checks
/// run before the first merge.
///
/// # Examples
/// ```
/// use trailhac_core::{AgglomerationConfig, DistanceMatrix, Graph, NodeSet, agglomerate};
///
/// let graph = Graph::try_new(4, [])?;
/// let matrix = DistanceMatrix::try_from_rows(vec![
///     vec![0.0, 1.0, 1.0, 1.0],
///     vec![1.0, 0.0, 1.0, 1.0],
///     vec![1.0, 1.0, 0.0, 1.0],
///     vec![1.0, 1.0, 1.0, 0.0],
/// ])?;
/// let bases: Vec<NodeSet> = (0..4).map(|node| NodeSet::from([node])).collect();
/// let linkage = agglomerate(&graph, &matrix, &bases, AgglomerationConfig::default())?;
/// let created: Vec<u64> = (0..3).map(|k| linkage.merged_id(k).get()).collect();
/// assert_eq!(created, vec![4, 5, 6]);
/// assert!(linkage.distances().iter().all(|&d| d == 1.0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn agglomerate(
    graph: &Graph,
    distances: &DistanceMatrix,
    bases: &[NodeSet],
    config: AgglomerationConfig,
) -> Result<Linkage, AgglomerationError> {
    agglomerate_with_cancel(graph, distances, bases, config, &CancelToken::new())
}

/// Runs the agglomeration, checking `cancel` before every merge.
///
/// # Errors
/// Returns the errors of [`agglomerate`] and
/// [`AgglomerationError::Cancelled`] once `cancel` is observed.
#[instrument(
    name = "core.agglomerate",
    err,
    skip(graph, distances, bases, cancel),
    fields(
        bases = bases.len(),
        nodes = graph.node_count(),
        method = config.method.as_str(),
        weighted = config.use_edge_weights,
        parallel = config.parallel,
    ),
)]
pub fn agglomerate_with_cancel(
    graph: &Graph,
    distances: &DistanceMatrix,
    bases: &[NodeSet],
    config: AgglomerationConfig,
    cancel: &CancelToken,
) -> Result<Linkage, AgglomerationError> {
    validate_inputs(graph, distances, bases)?;
    let base_count = bases.len();
    let mut arena = ClusterArena::from_bases(graph, bases);
    let rule = PairDistance::new(graph, distances, config.method, config.use_edge_weights);
    let mut working = fill_initial(&arena, &rule, config.parallel);
    let merges = base_count - 1;
    let mut records = Vec::with_capacity(merges);

    for step in 0..merges {
        if cancel.is_cancelled() {
            return Err(AgglomerationError::Cancelled {
                completed_merges: step,
            });
        }
        let (survivor, absorbed, distance) =
            working
                .closest_pair()
                .ok_or(AgglomerationError::NoCandidatePair {
                    completed_merges: step,
                })?;

        let left = arena.get(survivor).id;
        let right = arena.get(absorbed).id;
        let size = arena.merge(survivor, absorbed, ClusterId::new((base_count + step) as u64));
        records.push(LinkageRecord::new(left, right, distance, size));

        for (target, value) in recompute_row(&arena, &rule, survivor, config.parallel) {
            working.set_symmetric(survivor, target, value);
        }
        working.retire(absorbed);
        record_merge();

        if (step + 1) % PROGRESS_INTERVAL == 0 {
            debug!(completed = step + 1, remaining = merges - step - 1, "agglomeration progress");
        }
    }

    info!(merges = records.len(), "agglomeration completed");
    Ok(Linkage::from_engine(base_count, records))
}

#[cfg(feature = "metrics")]
fn record_merge() {
    metrics::counter!("trailhac_merges_total").increment(1);
}

#[cfg(not(feature = "metrics"))]
fn record_merge() {}
