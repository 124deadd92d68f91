//! Union-find replay of a merge tree.
//!
//! Cutting the tree after `L` merges assigns every base the id of the cluster
//! that contains it at that point. Replaying records one at a time over a
//! disjoint set lets the enumerator walk all levels in a single pass.

use crate::{ClusterId, linkage::LinkageRecord};

#[derive(Clone, Debug)]
pub(super) struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub(super) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub(super) fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != node {
            let parent = self.parent[node];
            self.parent[node] = root;
            node = parent;
        }

        root
    }

    pub(super) fn union(&mut self, left: usize, right: usize) -> usize {
        let mut left = self.find(left);
        let mut right = self.find(right);
        if left == right {
            return left;
        }
        let left_rank = self.rank[left];
        let right_rank = self.rank[right];
        if left_rank < right_rank {
            std::mem::swap(&mut left, &mut right);
        }
        self.parent[right] = left;
        if left_rank == right_rank {
            self.rank[left] = left_rank.saturating_add(1);
        }
        left
    }
}

/// Incremental cut state: bases grouped by the merges applied so far.
#[derive(Clone, Debug)]
pub(super) struct MergeReplay {
    sets: DisjointSet,
    // A base contained in each cluster id seen so far.
    anchors: Vec<usize>,
    // Cluster id carried by each disjoint-set root.
    root_ids: Vec<ClusterId>,
    applied: usize,
}

impl MergeReplay {
    pub(super) fn new(base_count: usize) -> Self {
        Self {
            sets: DisjointSet::new(base_count),
            anchors: (0..base_count).collect(),
            root_ids: (0..base_count as u64).map(ClusterId::new).collect(),
            applied: 0,
        }
    }

    /// Returns the number of records applied.
    pub(super) const fn applied(&self) -> usize {
        self.applied
    }

    /// Applies the next record.
    ///
    /// Records must come from a validated [`crate::Linkage`], so both ids are
    /// already known.
    pub(super) fn apply(&mut self, record: &LinkageRecord) {
        let base_count = self.root_ids.len();
        let left = self.anchor_of(record.left());
        let right = self.anchor_of(record.right());
        let root = self.sets.union(left, right);
        let merged = ClusterId::new((base_count + self.applied) as u64);
        self.root_ids[root] = merged;
        self.anchors.push(left);
        self.applied += 1;
    }

    fn anchor_of(&self, id: ClusterId) -> usize {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.anchors.get(index).copied())
            .unwrap_or_default()
    }

    /// Returns the current cluster id of every base.
    pub(super) fn cluster_ids(&mut self) -> Vec<ClusterId> {
        (0..self.root_ids.len())
            .map(|base| {
                let root = self.sets.find(base);
                self.root_ids[root]
            })
            .collect()
    }
}
