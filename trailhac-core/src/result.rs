//! Result types for hierarchy runs.
//!
//! Covers cluster identifiers, flat cuts of the merge tree and the per-level
//! report assembled by [`crate::Trailhac::run`].

use std::collections::HashMap;

use crate::{
    graph::NodeSet,
    hierarchy::CoverageStats,
    linkage::Linkage,
    quality::{PartitionScores, SelectionCriterion},
};

/// Identifier assigned to a cluster.
///
/// Ids below the base count name bases; larger ids name merges.
///
/// # Examples
/// ```
/// use trailhac_core::ClusterId;
///
/// let id = ClusterId::new(4);
/// assert_eq!(id.get(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct ClusterId(u64);

impl ClusterId {
    /// Creates a new cluster identifier.
    #[rustfmt::skip]
    #[must_use]
    pub fn new(id: u64) -> Self { Self(id) }

    /// Returns the underlying numeric identifier.
    #[rustfmt::skip]
    #[must_use]
    pub fn get(self) -> u64 { self.0 }
}

/// Assignment of every base to its cluster after a fixed number of merges.
///
/// `labels` renumbers the cluster ids contiguously in order of first
/// appearance, so label `0` always holds base `0`.
///
/// # Examples
/// ```
/// use trailhac_core::{ClusterId, FlatPartition};
///
/// let partition = FlatPartition::from_cluster_ids(
///     [5, 2, 5, 3].into_iter().map(ClusterId::new).collect(),
/// );
/// assert_eq!(partition.labels(), &[0, 1, 0, 2]);
/// assert_eq!(partition.cluster_count(), 3);
/// assert_eq!(partition.groups(), vec![vec![0, 2], vec![1], vec![3]]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlatPartition {
    cluster_ids: Vec<ClusterId>,
    labels: Vec<usize>,
    cluster_count: usize,
}

impl FlatPartition {
    /// Builds a partition from one cluster id per base.
    #[must_use]
    pub fn from_cluster_ids(cluster_ids: Vec<ClusterId>) -> Self {
        let mut seen: HashMap<ClusterId, usize> = HashMap::with_capacity(cluster_ids.len());
        let labels = cluster_ids
            .iter()
            .map(|&id| {
                let next = seen.len();
                *seen.entry(id).or_insert(next)
            })
            .collect();
        Self {
            cluster_ids,
            labels,
            cluster_count: seen.len(),
        }
    }

    /// Returns the cluster id of each base.
    #[rustfmt::skip]
    #[must_use]
    pub fn cluster_ids(&self) -> &[ClusterId] { &self.cluster_ids }

    /// Returns the contiguous label of each base.
    #[rustfmt::skip]
    #[must_use]
    pub fn labels(&self) -> &[usize] { &self.labels }

    /// Returns the number of distinct clusters.
    #[rustfmt::skip]
    #[must_use]
    pub fn cluster_count(&self) -> usize { self.cluster_count }

    /// Returns the base indices of each cluster, ordered by smallest base.
    #[must_use]
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.cluster_count];
        for (base, &label) in self.labels.iter().enumerate() {
            groups[label].push(base);
        }
        groups
    }
}

/// Why a merge level produced no scored partition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[non_exhaustive]
pub enum SkipReason {
    /// The merge distance was below the configured minimum.
    BelowMinDistance,
    /// The merge distance was zero.
    NonPositiveDistance,
    /// The community count fell outside the configured window.
    CommunityCountOutsideWindow {
        /// Communities left after size filtering.
        count: usize,
    },
    /// Scoring the partition failed.
    ScoringFailed {
        /// Stable code of the scoring error.
        code: &'static str,
        /// Rendered error message.
        message: String,
    },
}

/// A level that was enumerated but not scored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SkippedLevel {
    /// Merge rank of the level.
    pub level: usize,
    /// Original merge distance, absent for rank `0`.
    pub distance: Option<f64>,
    /// Why the level was skipped.
    pub reason: SkipReason,
}

/// Scored partition for one merge level.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LevelReport {
    /// Merge rank of the level (`0` means no merges applied).
    pub level: usize,
    /// Original merge distance, absent for rank `0`.
    pub distance: Option<f64>,
    /// Communities after expansion, filtering and coverage completion.
    pub communities: Vec<NodeSet>,
    /// How coverage completion placed uncovered nodes.
    pub coverage: CoverageStats,
    /// Quality statistics of the partition.
    pub scores: PartitionScores,
}

/// Output of a full run: linkage, per-level table and best level.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HierarchyReport {
    linkage: Linkage,
    levels: Vec<LevelReport>,
    skipped: Vec<SkippedLevel>,
    criterion: SelectionCriterion,
    best: Option<usize>,
}

impl HierarchyReport {
    pub(crate) fn new(
        linkage: Linkage,
        levels: Vec<LevelReport>,
        skipped: Vec<SkippedLevel>,
        criterion: SelectionCriterion,
        best: Option<usize>,
    ) -> Self {
        Self {
            linkage,
            levels,
            skipped,
            criterion,
            best,
        }
    }

    /// Returns the merge tree.
    #[rustfmt::skip]
    #[must_use]
    pub fn linkage(&self) -> &Linkage { &self.linkage }

    /// Returns the scored levels in ascending rank order.
    #[rustfmt::skip]
    #[must_use]
    pub fn levels(&self) -> &[LevelReport] { &self.levels }

    /// Returns the levels that were enumerated but not scored.
    #[rustfmt::skip]
    #[must_use]
    pub fn skipped(&self) -> &[SkippedLevel] { &self.skipped }

    /// Returns the criterion used to pick the best level.
    #[rustfmt::skip]
    #[must_use]
    pub fn criterion(&self) -> SelectionCriterion { self.criterion }

    /// Returns the best-scoring level, if any level was scored.
    #[must_use]
    pub fn best_level(&self) -> Option<&LevelReport> {
        self.best.and_then(|index| self.levels.get(index))
    }
}
