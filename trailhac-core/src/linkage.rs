//! Linkage structure produced by the agglomeration engine.
//!
//! A [`Linkage`] over `B` bases holds exactly `B − 1` merge records. Cluster
//! ids below `B` name bases; the `k`-th record creates id `B + k`. The rows
//! convert directly into the `[left, right, distance, size]` layout used by
//! common dendrogram tooling.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::ClusterId;

/// One merge of the hierarchy.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LinkageRecord {
    left: ClusterId,
    right: ClusterId,
    distance: f64,
    size: usize,
}

impl LinkageRecord {
    /// Creates a record merging `left` and `right` at `distance` into a
    /// cluster of `size` nodes.
    #[must_use]
    pub fn new(left: ClusterId, right: ClusterId, distance: f64, size: usize) -> Self {
        Self {
            left,
            right,
            distance,
            size,
        }
    }

    /// Returns the id of the surviving side of the merge.
    #[rustfmt::skip]
    #[must_use]
    pub fn left(&self) -> ClusterId { self.left }

    /// Returns the id of the absorbed side of the merge.
    #[rustfmt::skip]
    #[must_use]
    pub fn right(&self) -> ClusterId { self.right }

    /// Returns the distance at which the merge happened.
    #[rustfmt::skip]
    #[must_use]
    pub fn distance(&self) -> f64 { self.distance }

    /// Returns the node count of the merged cluster.
    #[rustfmt::skip]
    #[must_use]
    pub fn size(&self) -> usize { self.size }
}

/// Errors raised when a sequence of records does not form a merge tree.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum LinkageError {
    /// A linkage needs at least one base.
    #[error("a linkage requires at least one base")]
    NoBases,
    /// The record count differs from `base_count - 1`.
    #[error("expected {expected} merge records but found {actual}")]
    RecordCountMismatch {
        /// Required number of records.
        expected: usize,
        /// Number of records supplied.
        actual: usize,
    },
    /// A record referenced an id that does not exist yet.
    #[error("record {record} references unknown cluster {id}")]
    UnknownCluster {
        /// Index of the offending record.
        record: usize,
        /// Referenced cluster id.
        id: u64,
    },
    /// A record referenced a cluster already consumed by an earlier merge.
    #[error("record {record} reuses cluster {id} after it was merged")]
    ClusterReused {
        /// Index of the offending record.
        record: usize,
        /// Referenced cluster id.
        id: u64,
    },
    /// A record merged a cluster with itself.
    #[error("record {record} merges cluster {id} with itself")]
    SelfMerge {
        /// Index of the offending record.
        record: usize,
        /// Referenced cluster id.
        id: u64,
    },
    /// A record carried a negative or non-finite distance.
    #[error("record {record} has invalid distance {distance}")]
    InvalidDistance {
        /// Index of the offending record.
        record: usize,
        /// Offending distance.
        distance: f64,
    },
}

impl LinkageError {
    /// Returns a stable, machine-readable error code for the variant.
    #[must_use]
    pub const fn code(&self) -> LinkageErrorCode {
        match self {
            Self::NoBases => LinkageErrorCode::NoBases,
            Self::RecordCountMismatch { .. } => LinkageErrorCode::RecordCountMismatch,
            Self::UnknownCluster { .. } => LinkageErrorCode::UnknownCluster,
            Self::ClusterReused { .. } => LinkageErrorCode::ClusterReused,
            Self::SelfMerge { .. } => LinkageErrorCode::SelfMerge,
            Self::InvalidDistance { .. } => LinkageErrorCode::InvalidDistance,
        }
    }
}

/// Machine-readable error codes for [`LinkageError`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum LinkageErrorCode {
    /// No bases were declared.
    NoBases,
    /// Record count differs from `base_count - 1`.
    RecordCountMismatch,
    /// A record referenced an unknown id.
    UnknownCluster,
    /// A record reused a consumed id.
    ClusterReused,
    /// A record merged a cluster with itself.
    SelfMerge,
    /// A record carried an invalid distance.
    InvalidDistance,
}

impl LinkageErrorCode {
    /// Returns the symbolic identifier for logging and metrics surfaces.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoBases => "LINKAGE_NO_BASES",
            Self::RecordCountMismatch => "LINKAGE_RECORD_COUNT_MISMATCH",
            Self::UnknownCluster => "LINKAGE_UNKNOWN_CLUSTER",
            Self::ClusterReused => "LINKAGE_CLUSTER_REUSED",
            Self::SelfMerge => "LINKAGE_SELF_MERGE",
            Self::InvalidDistance => "LINKAGE_INVALID_DISTANCE",
        }
    }
}

/// Complete binary merge tree over a set of bases.
///
/// # Examples
/// ```
/// use trailhac_core::{ClusterId, Linkage, LinkageRecord};
///
/// let linkage = Linkage::try_new(
///     3,
///     vec![
///         LinkageRecord::new(ClusterId::new(0), ClusterId::new(1), 0.5, 4),
///         LinkageRecord::new(ClusterId::new(3), ClusterId::new(2), 1.5, 6),
///     ],
/// )?;
/// assert_eq!(linkage.merge_count(), 2);
/// assert_eq!(linkage.to_rows()[1], [3.0, 2.0, 1.5, 6.0]);
/// # Ok::<(), trailhac_core::LinkageError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Linkage {
    base_count: usize,
    records: Vec<LinkageRecord>,
}

impl Linkage {
    /// Validates `records` as a merge tree over `base_count` bases.
    ///
    /// # Errors
    /// Returns [`LinkageError`] when the record count is not
    /// `base_count - 1`, when a record references an id that does not exist
    /// yet or was already merged, when a record merges an id with itself, or
    /// when a distance is negative or non-finite.
    pub fn try_new(base_count: usize, records: Vec<LinkageRecord>) -> Result<Self, LinkageError> {
        let expected = base_count.checked_sub(1).ok_or(LinkageError::NoBases)?;
        if records.len() != expected {
            return Err(LinkageError::RecordCountMismatch {
                expected,
                actual: records.len(),
            });
        }

        let mut consumed = BTreeSet::new();
        for (index, record) in records.iter().enumerate() {
            let known = (base_count + index) as u64;
            if !record.distance.is_finite() || record.distance < 0.0 {
                return Err(LinkageError::InvalidDistance {
                    record: index,
                    distance: record.distance,
                });
            }
            if record.left == record.right {
                return Err(LinkageError::SelfMerge {
                    record: index,
                    id: record.left.get(),
                });
            }
            for id in [record.left.get(), record.right.get()] {
                if id >= known {
                    return Err(LinkageError::UnknownCluster { record: index, id });
                }
                if !consumed.insert(id) {
                    return Err(LinkageError::ClusterReused { record: index, id });
                }
            }
        }
        Ok(Self {
            base_count,
            records,
        })
    }

    pub(crate) fn from_engine(base_count: usize, records: Vec<LinkageRecord>) -> Self {
        Self {
            base_count,
            records,
        }
    }

    /// Returns the number of bases the tree was built over.
    #[rustfmt::skip]
    #[must_use]
    pub fn base_count(&self) -> usize { self.base_count }

    /// Returns the merge records in merge order.
    #[rustfmt::skip]
    #[must_use]
    pub fn records(&self) -> &[LinkageRecord] { &self.records }

    /// Returns the number of merges (`base_count - 1`).
    #[rustfmt::skip]
    #[must_use]
    pub fn merge_count(&self) -> usize { self.records.len() }

    /// Returns the merge distances in merge order.
    #[must_use]
    pub fn distances(&self) -> Vec<f64> {
        self.records.iter().map(LinkageRecord::distance).collect()
    }

    /// Returns the id created by the merge at `index`.
    #[must_use]
    pub fn merged_id(&self, index: usize) -> ClusterId {
        ClusterId::new((self.base_count + index) as u64)
    }

    /// Converts the records into `[left, right, distance, size]` rows.
    #[expect(
        clippy::cast_precision_loss,
        reason = "dendrogram rows store ids and sizes as floating-point values"
    )]
    #[must_use]
    pub fn to_rows(&self) -> Vec<[f64; 4]> {
        self.records
            .iter()
            .map(|record| {
                [
                    record.left.get() as f64,
                    record.right.get() as f64,
                    record.distance,
                    record.size as f64,
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn record(left: u64, right: u64, distance: f64) -> LinkageRecord {
        LinkageRecord::new(ClusterId::new(left), ClusterId::new(right), distance, 2)
    }

    #[test]
    fn single_base_has_no_records() {
        let linkage = Linkage::try_new(1, Vec::new()).expect("one base is a valid tree");
        assert_eq!(linkage.merge_count(), 0);
        assert!(linkage.to_rows().is_empty());
    }

    #[rstest]
    #[case::no_bases(0, vec![], LinkageErrorCode::NoBases)]
    #[case::too_few(3, vec![record(0, 1, 1.0)], LinkageErrorCode::RecordCountMismatch)]
    #[case::unknown(3, vec![record(0, 3, 1.0), record(1, 2, 1.0)], LinkageErrorCode::UnknownCluster)]
    #[case::reused(3, vec![record(0, 1, 1.0), record(0, 2, 1.0)], LinkageErrorCode::ClusterReused)]
    #[case::self_merge(2, vec![record(1, 1, 1.0)], LinkageErrorCode::SelfMerge)]
    #[case::negative(2, vec![record(0, 1, -1.0)], LinkageErrorCode::InvalidDistance)]
    #[case::nan(2, vec![record(0, 1, f64::NAN)], LinkageErrorCode::InvalidDistance)]
    fn rejects_malformed_trees(
        #[case] base_count: usize,
        #[case] records: Vec<LinkageRecord>,
        #[case] expected: LinkageErrorCode,
    ) {
        let err = Linkage::try_new(base_count, records).expect_err("tree must be rejected");
        assert_eq!(err.code(), expected);
    }

    #[test]
    fn exposes_distances_and_merged_ids() {
        let linkage = Linkage::try_new(3, vec![record(2, 0, 0.25), record(1, 3, 2.0)])
            .expect("tree must validate");
        assert_eq!(linkage.distances(), vec![0.25, 2.0]);
        assert_eq!(linkage.merged_id(1), ClusterId::new(4));
        assert_eq!(linkage.base_count(), 3);
    }
}
