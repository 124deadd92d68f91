//! Dendrogram cuts and community extraction.
//!
//! Each merge rank `L` of a [`Linkage`] defines a flat cut: the clusters that
//! exist after exactly `L` merges. This module:
//!
//! - replays the merge records over a disjoint set to produce the cut at
//!   every eligible rank in one pass;
//! - expands each cut into node communities by unioning the bases of each
//!   cluster;
//! - filters communities by size and optionally by count;
//! - completes coverage so every graph node belongs to a community.
//!
//! Ranks replace merge distances as cut levels; the original distances are
//! kept only for filtering and reporting.

mod communities;
mod union_find;

use std::num::NonZeroUsize;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    graph::{Graph, NodeSet},
    linkage::{Linkage, LinkageRecord},
    result::{FlatPartition, SkipReason, SkippedLevel},
};

pub use self::communities::{
    CoverageStats, cover_with_neighbours, cover_with_singletons, drop_small_communities,
    drop_unmerged_bases, merge_bases,
};

use self::union_find::MergeReplay;

/// Inclusive bounds on the number of communities a level may produce.
///
/// # Examples
/// ```
/// use trailhac_core::CommunityWindow;
///
/// let window = CommunityWindow::new(2, 4).expect("bounds are ordered");
/// assert!(window.contains(3));
/// assert!(!window.contains(5));
/// assert!(CommunityWindow::new(4, 2).is_none());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CommunityWindow {
    min: usize,
    max: usize,
}

impl CommunityWindow {
    /// Creates a window, returning `None` when `min > max`.
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Option<Self> {
        if min <= max {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Returns the lower bound.
    #[rustfmt::skip]
    #[must_use]
    pub const fn min(&self) -> usize { self.min }

    /// Returns the upper bound.
    #[rustfmt::skip]
    #[must_use]
    pub const fn max(&self) -> usize { self.max }

    /// Returns whether `count` lies inside the window.
    #[must_use]
    pub const fn contains(&self, count: usize) -> bool {
        self.min <= count && count <= self.max
    }
}

/// Strategy used to place nodes that no community covers.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CoverageMode {
    /// Attach nodes to the community holding most of their neighbours.
    #[default]
    Neighbours,
    /// Give every uncovered node its own community.
    Singletons,
}

/// Parameters of the cut enumerator.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use trailhac_core::{CommunityWindow, CutConfig};
///
/// let config = CutConfig::default()
///     .with_min_merge_distance(0.5)
///     .with_min_community_size(NonZeroUsize::new(3).expect("non-zero"))
///     .with_window(CommunityWindow::new(2, 6));
/// assert_eq!(config.min_community_size().get(), 3);
/// assert_eq!(config.window().map(|w| w.max()), Some(6));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CutConfig {
    min_merge_distance: f64,
    min_community_size: NonZeroUsize,
    min_neighbour_support: NonZeroUsize,
    window: Option<CommunityWindow>,
    include_unmerged: bool,
    drop_unmerged_bases: bool,
    coverage: CoverageMode,
}

/// Default minimum community size.
pub const DEFAULT_MIN_COMMUNITY_SIZE: NonZeroUsize = match NonZeroUsize::new(5) {
    Some(size) => size,
    None => NonZeroUsize::MIN,
};

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            min_merge_distance: 0.0,
            min_community_size: DEFAULT_MIN_COMMUNITY_SIZE,
            min_neighbour_support: NonZeroUsize::MIN,
            window: None,
            include_unmerged: false,
            drop_unmerged_bases: false,
            coverage: CoverageMode::Neighbours,
        }
    }
}

impl CutConfig {
    /// Skips levels whose merge distance is below `distance`.
    #[must_use]
    pub const fn with_min_merge_distance(mut self, distance: f64) -> Self {
        self.min_merge_distance = distance;
        self
    }

    /// Drops communities with fewer than `size` nodes.
    #[must_use]
    pub const fn with_min_community_size(mut self, size: NonZeroUsize) -> Self {
        self.min_community_size = size;
        self
    }

    /// Requires at least `support` neighbours before attaching a node.
    #[must_use]
    pub const fn with_min_neighbour_support(mut self, support: NonZeroUsize) -> Self {
        self.min_neighbour_support = support;
        self
    }

    /// Rejects levels whose community count falls outside `window`.
    #[must_use]
    pub const fn with_window(mut self, window: Option<CommunityWindow>) -> Self {
        self.window = window;
        self
    }

    /// Also evaluates rank `0`, where no merges have been applied.
    #[must_use]
    pub const fn with_include_unmerged(mut self, enabled: bool) -> Self {
        self.include_unmerged = enabled;
        self
    }

    /// Removes communities identical to an input base before size filtering.
    #[must_use]
    pub const fn with_drop_unmerged_bases(mut self, enabled: bool) -> Self {
        self.drop_unmerged_bases = enabled;
        self
    }

    /// Selects how uncovered nodes are placed.
    #[must_use]
    pub const fn with_coverage(mut self, coverage: CoverageMode) -> Self {
        self.coverage = coverage;
        self
    }

    /// Returns the minimum merge distance.
    #[rustfmt::skip]
    #[must_use]
    pub const fn min_merge_distance(&self) -> f64 { self.min_merge_distance }

    /// Returns the minimum community size.
    #[rustfmt::skip]
    #[must_use]
    pub const fn min_community_size(&self) -> NonZeroUsize { self.min_community_size }

    /// Returns the minimum neighbour support for coverage.
    #[rustfmt::skip]
    #[must_use]
    pub const fn min_neighbour_support(&self) -> NonZeroUsize { self.min_neighbour_support }

    /// Returns the community-count window, if any.
    #[rustfmt::skip]
    #[must_use]
    pub const fn window(&self) -> Option<CommunityWindow> { self.window }

    /// Returns whether rank `0` is evaluated.
    #[rustfmt::skip]
    #[must_use]
    pub const fn includes_unmerged(&self) -> bool { self.include_unmerged }

    /// Returns whether communities equal to a base are removed.
    #[rustfmt::skip]
    #[must_use]
    pub const fn drops_unmerged_bases(&self) -> bool { self.drop_unmerged_bases }

    /// Returns the coverage strategy.
    #[rustfmt::skip]
    #[must_use]
    pub const fn coverage(&self) -> CoverageMode { self.coverage }
}

/// Errors returned by the cut enumerator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum HierarchyError {
    /// The linkage was built over a different number of bases.
    #[error("linkage covers {linkage} bases but {bases} were supplied")]
    BaseCountMismatch {
        /// Base count recorded in the linkage.
        linkage: usize,
        /// Number of bases supplied.
        bases: usize,
    },
    /// A base referenced a node the graph does not have.
    #[error("base {base} references node {node} outside 0..{node_count}")]
    NodeOutOfRange {
        /// Index of the offending base.
        base: usize,
        /// Offending node id.
        node: usize,
        /// Number of graph nodes.
        node_count: usize,
    },
    /// A cut was requested past the final merge.
    #[error("level {level} exceeds the {merges} merges of the linkage")]
    LevelOutOfRange {
        /// Requested level.
        level: usize,
        /// Number of merges available.
        merges: usize,
    },
}

impl HierarchyError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> HierarchyErrorCode {
        match self {
            Self::BaseCountMismatch { .. } => HierarchyErrorCode::BaseCountMismatch,
            Self::NodeOutOfRange { .. } => HierarchyErrorCode::NodeOutOfRange,
            Self::LevelOutOfRange { .. } => HierarchyErrorCode::LevelOutOfRange,
        }
    }
}

/// Machine-readable error codes for [`HierarchyError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum HierarchyErrorCode {
    /// Linkage and bases disagree on the base count.
    BaseCountMismatch,
    /// A base node was out of range.
    NodeOutOfRange,
    /// The requested level does not exist.
    LevelOutOfRange,
}

impl HierarchyErrorCode {
    /// Returns the symbolic identifier for logging and metrics surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseCountMismatch => "HIERARCHY_BASE_COUNT_MISMATCH",
            Self::NodeOutOfRange => "HIERARCHY_NODE_OUT_OF_RANGE",
            Self::LevelOutOfRange => "HIERARCHY_LEVEL_OUT_OF_RANGE",
        }
    }
}

/// A flat cut of the merge tree.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatCut {
    /// Number of merges applied.
    pub level: usize,
    /// Distance of the last applied merge, absent for rank `0`.
    pub distance: Option<f64>,
    /// Cluster assignment of every base.
    pub partition: FlatPartition,
}

/// One level visited by [`flat_cuts`].
#[derive(Clone, Debug, PartialEq)]
pub enum LevelCut {
    /// The level passed the distance filters.
    Cut(FlatCut),
    /// The level was rejected by the distance filters.
    Skipped(SkippedLevel),
}

/// Cuts at every eligible level plus the levels that were filtered out.
///
/// Collected from [`flat_cuts`] when every cut is needed at once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CutSchedule {
    /// Eligible cuts in ascending level order.
    pub cuts: Vec<FlatCut>,
    /// Levels rejected by the distance filters.
    pub skipped: Vec<SkippedLevel>,
}

impl FromIterator<LevelCut> for CutSchedule {
    fn from_iter<I: IntoIterator<Item = LevelCut>>(iter: I) -> Self {
        let mut schedule = Self::default();
        for step in iter {
            match step {
                LevelCut::Cut(cut) => schedule.cuts.push(cut),
                LevelCut::Skipped(skipped) => schedule.skipped.push(skipped),
            }
        }
        schedule
    }
}

/// Communities derived from one cut, ready for scoring.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidatePartition {
    /// Number of merges applied.
    pub level: usize,
    /// Distance of the last applied merge, absent for rank `0`.
    pub distance: Option<f64>,
    /// Communities covering every graph node.
    pub communities: Vec<NodeSet>,
    /// How coverage completion placed uncovered nodes.
    pub coverage: CoverageStats,
}

/// Outcome of expanding one cut into communities.
#[derive(Clone, Debug, PartialEq)]
pub enum CutOutcome {
    /// The cut produced a partition worth scoring.
    Candidate(CandidatePartition),
    /// The community count fell outside the configured window.
    OutsideWindow {
        /// Communities left after size filtering.
        count: usize,
    },
}

/// Candidates of every eligible level plus the skipped ones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CandidateSet {
    /// Candidates in ascending level order.
    pub candidates: Vec<CandidatePartition>,
    /// Levels that produced no candidate, in ascending level order.
    pub skipped: Vec<SkippedLevel>,
}

/// Returns the base assignment after exactly `level` merges.
///
/// # Errors
/// Returns [`HierarchyError::LevelOutOfRange`] when `level` exceeds the merge
/// count.
///
/// # Examples
/// ```
/// use trailhac_core::{ClusterId, Linkage, LinkageRecord, cut_at};
///
/// let linkage = Linkage::try_new(
///     3,
///     vec![
///         LinkageRecord::new(ClusterId::new(1), ClusterId::new(2), 1.0, 4),
///         LinkageRecord::new(ClusterId::new(0), ClusterId::new(3), 2.0, 6),
///     ],
/// )?;
/// let partition = cut_at(&linkage, 1)?;
/// assert_eq!(partition.groups(), vec![vec![0], vec![1, 2]]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn cut_at(linkage: &Linkage, level: usize) -> Result<FlatPartition, HierarchyError> {
    let records = linkage
        .records()
        .get(..level)
        .ok_or(HierarchyError::LevelOutOfRange {
            level,
            merges: linkage.merge_count(),
        })?;
    let mut replay = MergeReplay::new(linkage.base_count());
    for record in records {
        replay.apply(record);
    }
    Ok(FlatPartition::from_cluster_ids(replay.cluster_ids()))
}

fn distance_filter(distance: f64, min_merge_distance: f64) -> Option<SkipReason> {
    if distance <= 0.0 {
        Some(SkipReason::NonPositiveDistance)
    } else if distance < min_merge_distance {
        Some(SkipReason::BelowMinDistance)
    } else {
        None
    }
}

/// Walks the levels of a linkage in ascending order, replaying one merge per
/// step. Returned by [`flat_cuts`].
#[derive(Clone, Debug)]
pub struct FlatCuts<'a> {
    records: std::slice::Iter<'a, LinkageRecord>,
    replay: MergeReplay,
    min_merge_distance: f64,
    unmerged_pending: bool,
}

impl Iterator for FlatCuts<'_> {
    type Item = LevelCut;

    fn next(&mut self) -> Option<Self::Item> {
        if std::mem::take(&mut self.unmerged_pending) {
            return Some(LevelCut::Cut(FlatCut {
                level: 0,
                distance: None,
                partition: FlatPartition::from_cluster_ids(self.replay.cluster_ids()),
            }));
        }
        let record = self.records.next()?;
        self.replay.apply(record);
        let level = self.replay.applied();
        let distance = record.distance();
        Some(match distance_filter(distance, self.min_merge_distance) {
            Some(reason) => LevelCut::Skipped(SkippedLevel {
                level,
                distance: Some(distance),
                reason,
            }),
            None => LevelCut::Cut(FlatCut {
                level,
                distance: Some(distance),
                partition: FlatPartition::from_cluster_ids(self.replay.cluster_ids()),
            }),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.records.len() + usize::from(self.unmerged_pending);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FlatCuts<'_> {}

/// Yields the cut at every level of `linkage`, one merge at a time.
///
/// Level `L` (for `1..=merge_count`) is yielded as [`LevelCut::Skipped`] when
/// its merge distance is non-positive or below the configured minimum. Level
/// `0` comes first and only when [`CutConfig::includes_unmerged`] is set.
/// Partitions are built only for levels that pass the filters.
///
/// # Examples
/// ```
/// use trailhac_core::{ClusterId, CutConfig, CutSchedule, Linkage, LinkageRecord, flat_cuts};
///
/// let linkage = Linkage::try_new(
///     3,
///     vec![
///         LinkageRecord::new(ClusterId::new(0), ClusterId::new(1), 0.0, 2),
///         LinkageRecord::new(ClusterId::new(3), ClusterId::new(2), 2.0, 3),
///     ],
/// )?;
/// let schedule: CutSchedule = flat_cuts(&linkage, &CutConfig::default()).collect();
/// assert_eq!(schedule.cuts.len(), 1);
/// assert_eq!(schedule.skipped.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn flat_cuts<'a>(linkage: &'a Linkage, config: &CutConfig) -> FlatCuts<'a> {
    FlatCuts {
        records: linkage.records().iter(),
        replay: MergeReplay::new(linkage.base_count()),
        min_merge_distance: config.min_merge_distance,
        unmerged_pending: config.include_unmerged,
    }
}

/// Expands `cut` into communities over `graph`.
///
/// Bases of each cluster are unioned, repeated communities are removed,
/// communities below the minimum size are dropped and the window is checked.
/// Surviving partitions are then completed to cover every node.
#[must_use]
pub fn communities_for_cut(
    graph: &Graph,
    bases: &[NodeSet],
    cut: &FlatCut,
    config: &CutConfig,
) -> CutOutcome {
    let mut communities = merge_bases(bases, &cut.partition.groups());
    if config.drop_unmerged_bases {
        communities = drop_unmerged_bases(communities, bases);
    }
    communities = drop_small_communities(communities, config.min_community_size.get());
    if let Some(window) = config.window
        && !window.contains(communities.len())
    {
        return CutOutcome::OutsideWindow {
            count: communities.len(),
        };
    }
    let coverage = match config.coverage {
        CoverageMode::Neighbours => {
            cover_with_neighbours(&mut communities, graph, config.min_neighbour_support)
        }
        CoverageMode::Singletons => CoverageStats {
            assigned: 0,
            singletons: cover_with_singletons(&mut communities, graph.node_count()),
        },
    };
    CutOutcome::Candidate(CandidatePartition {
        level: cut.level,
        distance: cut.distance,
        communities,
        coverage,
    })
}

fn validate_bases(graph: &Graph, bases: &[NodeSet], linkage: &Linkage) -> Result<(), HierarchyError> {
    if linkage.base_count() != bases.len() {
        return Err(HierarchyError::BaseCountMismatch {
            linkage: linkage.base_count(),
            bases: bases.len(),
        });
    }
    let node_count = graph.node_count();
    for (base, nodes) in bases.iter().enumerate() {
        if let Some(&node) = nodes.last()
            && node >= node_count
        {
            return Err(HierarchyError::NodeOutOfRange {
                base,
                node,
                node_count,
            });
        }
    }
    Ok(())
}

/// Enumerates the candidate partition of every eligible level.
///
/// # Errors
/// Returns [`HierarchyError::BaseCountMismatch`] when `bases` does not match
/// the linkage and [`HierarchyError::NodeOutOfRange`] when a base references
/// a node outside the graph.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use trailhac_core::{ClusterId, CutConfig, Graph, Linkage, LinkageRecord, NodeSet, enumerate_candidates};
///
/// let graph = Graph::try_new(4, [(0, 1), (1, 2), (2, 3)])?;
/// let bases: Vec<NodeSet> = vec![[0, 1].into(), [2, 3].into()];
/// let linkage = Linkage::try_new(
///     2,
///     vec![LinkageRecord::new(ClusterId::new(0), ClusterId::new(1), 1.5, 4)],
/// )?;
/// let config = CutConfig::default()
///     .with_min_community_size(NonZeroUsize::MIN)
///     .with_include_unmerged(true);
/// let set = enumerate_candidates(&graph, &bases, &linkage, &config)?;
/// assert_eq!(set.candidates.len(), 2);
/// assert_eq!(set.candidates[0].communities, bases);
/// assert_eq!(set.candidates[1].communities, vec![NodeSet::from([0, 1, 2, 3])]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "core.enumerate_cuts",
    err,
    skip(graph, bases, linkage, config),
    fields(bases = bases.len(), merges = linkage.merge_count()),
)]
pub fn enumerate_candidates(
    graph: &Graph,
    bases: &[NodeSet],
    linkage: &Linkage,
    config: &CutConfig,
) -> Result<CandidateSet, HierarchyError> {
    validate_bases(graph, bases, linkage)?;
    let cuts = flat_cuts(linkage, config);
    let mut set = CandidateSet {
        candidates: Vec::with_capacity(cuts.len()),
        skipped: Vec::new(),
    };
    for step in cuts {
        let cut = match step {
            LevelCut::Cut(cut) => cut,
            LevelCut::Skipped(skipped) => {
                set.skipped.push(skipped);
                continue;
            }
        };
        match communities_for_cut(graph, bases, &cut, config) {
            CutOutcome::Candidate(candidate) => set.candidates.push(candidate),
            CutOutcome::OutsideWindow { count } => {
                debug!(level = cut.level, count, "level outside community window");
                set.skipped.push(SkippedLevel {
                    level: cut.level,
                    distance: cut.distance,
                    reason: SkipReason::CommunityCountOutsideWindow { count },
                });
            }
        }
    }
    set.skipped.sort_by_key(|skipped| skipped.level);
    debug!(
        candidates = set.candidates.len(),
        skipped = set.skipped.len(),
        "cut enumeration completed"
    );
    Ok(set)
}

#[cfg(test)]
mod tests;
