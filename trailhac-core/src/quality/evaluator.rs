//! Scoring of candidate partitions and best-level selection.

use thiserror::Error;
use tracing::instrument;

use crate::{
    distance::DistanceMatrix,
    graph::{Graph, NodeSet},
};

use super::{
    fitness::{EdgeWeighting, FitnessReport, ratio},
    modularity::{cao_modularity, eq_modularity, overlap_modularity},
};

/// Quality statistics of one partition.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PartitionScores {
    /// Number of communities.
    pub community_count: usize,
    /// Summed community sizes over the node count.
    pub overlap_ratio: f64,
    /// Fraction of nodes that belong to no community with two or more nodes.
    pub unassigned_ratio: f64,
    /// Affiliation-normalised overlapping modularity.
    pub overlap_modularity: f64,
    /// Extended modularity (EQ).
    pub eq_modularity: f64,
    /// Belonging-coefficient modularity.
    pub cao_modularity: f64,
    /// Community fitness summaries.
    pub fitness: FitnessReport,
    /// Largest same-community pairwise distance.
    pub diameter: f64,
    /// Next positive merge distance over the diameter.
    pub separation_index: f64,
    /// Mean overlapping silhouette.
    pub silhouette_mean: f64,
    /// Mean of each node's best per-community silhouette.
    pub silhouette_max_mean: f64,
}

/// Errors raised while scoring a partition.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum QualityError {
    /// The graph has no nodes.
    #[error("cannot score a partition of an empty graph")]
    EmptyGraph,
    /// The distance matrix does not cover the graph's nodes.
    #[error("distance matrix has size {matrix} but the graph has {nodes} nodes")]
    MatrixSizeMismatch {
        /// Side length of the matrix.
        matrix: usize,
        /// Number of graph nodes.
        nodes: usize,
    },
    /// A community referenced a node the graph does not have.
    #[error("community {community} references node {node} outside 0..{node_count}")]
    NodeOutOfRange {
        /// Index of the offending community.
        community: usize,
        /// Offending node id.
        node: usize,
        /// Number of graph nodes.
        node_count: usize,
    },
}

impl QualityError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> QualityErrorCode {
        match self {
            Self::EmptyGraph => QualityErrorCode::EmptyGraph,
            Self::MatrixSizeMismatch { .. } => QualityErrorCode::MatrixSizeMismatch,
            Self::NodeOutOfRange { .. } => QualityErrorCode::NodeOutOfRange,
        }
    }
}

/// Machine-readable error codes for [`QualityError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum QualityErrorCode {
    /// The graph has no nodes.
    EmptyGraph,
    /// The matrix size differs from the node count.
    MatrixSizeMismatch,
    /// A community node was out of range.
    NodeOutOfRange,
}

impl QualityErrorCode {
    /// Returns the symbolic identifier for logging and metrics surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyGraph => "QUALITY_EMPTY_GRAPH",
            Self::MatrixSizeMismatch => "QUALITY_MATRIX_SIZE_MISMATCH",
            Self::NodeOutOfRange => "QUALITY_NODE_OUT_OF_RANGE",
        }
    }
}

fn validate(
    graph: &Graph,
    distances: &DistanceMatrix,
    communities: &[NodeSet],
) -> Result<(), QualityError> {
    let node_count = graph.node_count();
    if node_count == 0 {
        return Err(QualityError::EmptyGraph);
    }
    if distances.size() != node_count {
        return Err(QualityError::MatrixSizeMismatch {
            matrix: distances.size(),
            nodes: node_count,
        });
    }
    for (community, nodes) in communities.iter().enumerate() {
        if let Some(&node) = nodes.last()
            && node >= node_count
        {
            return Err(QualityError::NodeOutOfRange {
                community,
                node,
                node_count,
            });
        }
    }
    Ok(())
}

#[expect(
    clippy::cast_precision_loss,
    reason = "node counts stay far below the f64 mantissa"
)]
fn coverage_ratios(communities: &[NodeSet], node_count: usize) -> (f64, f64) {
    let total: usize = communities.iter().map(NodeSet::len).sum();
    let mut assigned = vec![false; node_count];
    for &node in communities
        .iter()
        .filter(|community| community.len() > 1)
        .flatten()
    {
        if let Some(flag) = assigned.get_mut(node) {
            *flag = true;
        }
    }
    let unassigned = assigned.iter().filter(|&&flag| !flag).count();
    let nodes = node_count as f64;
    (
        ratio(total as f64, nodes),
        ratio(unassigned as f64, nodes),
    )
}

/// Largest pairwise distance between two members of the same community.
#[must_use]
pub fn partition_diameter(distances: &DistanceMatrix, communities: &[NodeSet]) -> f64 {
    let mut diameter = 0.0_f64;
    for community in communities {
        for &left in community {
            for &right in community.range(left + 1..) {
                if let Some(distance) = distances.get(left, right) {
                    diameter = diameter.max(distance);
                }
            }
        }
    }
    diameter
}

/// Dunn-like separation: the first positive merge distance at or after
/// `level` divided by `diameter`.
///
/// `merge_distances[level]` is the distance of the merge that follows the cut
/// at `level`. Returns `0` when no such merge exists or the diameter is zero.
#[must_use]
pub fn separation_index(merge_distances: &[f64], level: usize, diameter: f64) -> f64 {
    merge_distances
        .get(level..)
        .and_then(|rest| rest.iter().copied().find(|&distance| distance > 0.0))
        .map_or(0.0, |next| ratio(next, diameter))
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "mean distances are floating-point"
)]
fn mean_distance(
    distances: &DistanceMatrix,
    node: usize,
    members: impl Iterator<Item = usize>,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0_usize;
    for other in members.filter(|&other| other != node) {
        sum += distances.get(node, other).unwrap_or(0.0);
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

#[expect(clippy::float_arithmetic, reason = "silhouette is a normalised difference")]
fn silhouette_value(a: f64, b: f64) -> f64 {
    ratio(b - a, a.max(b))
}

/// Overlapping silhouette aggregates `(mean, max_mean)`.
///
/// For each covered node, `a` is the mean distance to its co-members across
/// all communities that contain it and `b` the smallest mean distance to a
/// community that does not. The per-node score is `(b - a) / max(a, b)`, or
/// `0` when the node has no co-members, no foreign community exists, or both
/// means are zero. The per-node maximum instead compares `b` with each owning
/// community separately and keeps the best score.
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "silhouette aggregates are floating-point means"
)]
pub fn overlapping_silhouette(
    distances: &DistanceMatrix,
    communities: &[NodeSet],
    node_count: usize,
) -> (f64, f64) {
    let mut total = 0.0;
    let mut total_max = 0.0;
    let mut scored = 0_usize;
    for node in 0..node_count {
        let (owning, foreign): (Vec<&NodeSet>, Vec<&NodeSet>) = communities
            .iter()
            .partition(|community| community.contains(&node));
        if owning.is_empty() {
            continue;
        }
        scored += 1;
        let nearest_foreign = foreign
            .iter()
            .filter_map(|community| mean_distance(distances, node, community.iter().copied()))
            .reduce(f64::min);
        let Some(b) = nearest_foreign else {
            continue;
        };
        let co_members: NodeSet = owning.iter().copied().flatten().copied().collect();
        if let Some(a) = mean_distance(distances, node, co_members.into_iter()) {
            total += silhouette_value(a, b);
        }
        let best = owning
            .iter()
            .filter_map(|community| mean_distance(distances, node, community.iter().copied()))
            .map(|a_c| silhouette_value(a_c, b))
            .reduce(f64::max);
        total_max += best.unwrap_or(0.0);
    }
    if scored == 0 {
        return (0.0, 0.0);
    }
    let scored = scored as f64;
    (total / scored, total_max / scored)
}

/// Computes every quality statistic for `communities`.
///
/// `level` is the number of merges behind the partition and
/// `merge_distances` the full merge-distance sequence; together they give
/// the separation index.
///
/// # Errors
/// Returns [`QualityError`] when the graph is empty, when the matrix does not
/// match the graph, or when a community references an unknown node.
///
/// # Examples
/// ```
/// use trailhac_core::{DistanceMatrix, EdgeWeighting, Graph, NodeSet, evaluate_partition};
///
/// let graph = Graph::try_new(4, [(0, 1), (2, 3)])?;
/// let matrix = DistanceMatrix::try_from_rows(vec![
///     vec![0.0, 1.0, 4.0, 4.0],
///     vec![1.0, 0.0, 4.0, 4.0],
///     vec![4.0, 4.0, 0.0, 1.0],
///     vec![4.0, 4.0, 1.0, 0.0],
/// ])?;
/// let communities: Vec<NodeSet> = vec![[0, 1].into(), [2, 3].into()];
/// let scores = evaluate_partition(
///     &graph,
///     &matrix,
///     &communities,
///     EdgeWeighting::Unweighted,
///     1,
///     &[1.0, 4.0],
/// )?;
/// assert_eq!(scores.community_count, 2);
/// assert_eq!(scores.diameter, 1.0);
/// assert_eq!(scores.separation_index, 4.0);
/// assert_eq!(scores.silhouette_mean, 0.75);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.evaluate_level",
    err,
    skip(graph, distances, communities, merge_distances),
    fields(communities = communities.len()),
)]
pub fn evaluate_partition(
    graph: &Graph,
    distances: &DistanceMatrix,
    communities: &[NodeSet],
    weighting: EdgeWeighting,
    level: usize,
    merge_distances: &[f64],
) -> Result<PartitionScores, QualityError> {
    validate(graph, distances, communities)?;
    let node_count = graph.node_count();
    let (overlap_ratio, unassigned_ratio) = coverage_ratios(communities, node_count);
    let diameter = partition_diameter(distances, communities);
    let (silhouette_mean, silhouette_max_mean) =
        overlapping_silhouette(distances, communities, node_count);
    Ok(PartitionScores {
        community_count: communities.len(),
        overlap_ratio,
        unassigned_ratio,
        overlap_modularity: overlap_modularity(graph, communities, weighting),
        eq_modularity: eq_modularity(graph, communities),
        cao_modularity: cao_modularity(graph, communities, weighting),
        fitness: FitnessReport::compute(graph, communities, weighting),
        diameter,
        separation_index: separation_index(merge_distances, level, diameter),
        silhouette_mean,
        silhouette_max_mean,
    })
}
