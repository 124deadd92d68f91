//! Turning a flat cut into node communities.
//!
//! A cut groups bases; each group becomes the union of its bases' nodes.
//! Small communities are dropped and the remaining nodes are then covered,
//! either by attaching them to the community holding most of their
//! neighbours or by giving them a singleton community.

use std::num::NonZeroUsize;

use crate::graph::{Graph, NodeSet};

/// How coverage completion placed uncovered nodes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CoverageStats {
    /// Nodes attached to an existing community.
    pub assigned: usize,
    /// Nodes that received their own singleton community.
    pub singletons: usize,
}

/// Unions the nodes of each group of bases.
///
/// Groups index into `bases`. Communities that repeat an earlier one are
/// removed, keeping the first occurrence.
///
/// # Examples
/// ```
/// use trailhac_core::{NodeSet, merge_bases};
///
/// let bases: Vec<NodeSet> = vec![[0, 1].into(), [1, 2].into(), [0, 1].into()];
/// let merged = merge_bases(&bases, &[vec![0, 1], vec![2]]);
/// assert_eq!(merged, vec![NodeSet::from([0, 1, 2]), NodeSet::from([0, 1])]);
///
/// let repeated = merge_bases(&bases, &[vec![0], vec![2]]);
/// assert_eq!(repeated, vec![NodeSet::from([0, 1])]);
/// ```
#[must_use]
pub fn merge_bases(bases: &[NodeSet], groups: &[Vec<usize>]) -> Vec<NodeSet> {
    let mut communities: Vec<NodeSet> = Vec::with_capacity(groups.len());
    for group in groups {
        let community: NodeSet = group
            .iter()
            .filter_map(|&base| bases.get(base))
            .flatten()
            .copied()
            .collect();
        if !communities.contains(&community) {
            communities.push(community);
        }
    }
    communities
}

/// Removes communities with fewer than `min_size` nodes.
///
/// Applying the filter twice yields the same result as applying it once.
#[must_use]
pub fn drop_small_communities(mut communities: Vec<NodeSet>, min_size: usize) -> Vec<NodeSet> {
    communities.retain(|community| community.len() >= min_size);
    communities
}

/// Removes communities that are identical to one of the input bases.
///
/// Only communities produced by an actual merge survive.
#[must_use]
pub fn drop_unmerged_bases(mut communities: Vec<NodeSet>, bases: &[NodeSet]) -> Vec<NodeSet> {
    communities.retain(|community| !bases.contains(community));
    communities
}

fn uncovered_nodes(communities: &[NodeSet], node_count: usize) -> Vec<usize> {
    let mut covered = vec![false; node_count];
    for &node in communities.iter().flatten() {
        if let Some(flag) = covered.get_mut(node) {
            *flag = true;
        }
    }
    covered
        .iter()
        .enumerate()
        .filter_map(|(node, &flag)| (!flag).then_some(node))
        .collect()
}

/// Completes `communities` so every graph node belongs to at least one.
///
/// Uncovered nodes are visited in ascending order. Each one joins the
/// community containing the most of its neighbours when that maximum is
/// unique and at least `min_support`; otherwise it forms a singleton
/// community. Later nodes see the placements of earlier ones. Existing
/// memberships are never removed.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use trailhac_core::{Graph, NodeSet, cover_with_neighbours};
///
/// let graph = Graph::try_new(5, [(0, 1), (1, 2), (2, 3), (3, 4)])?;
/// let mut communities = vec![NodeSet::from([0, 1, 2])];
/// let stats = cover_with_neighbours(&mut communities, &graph, NonZeroUsize::MIN);
/// assert_eq!(communities, vec![NodeSet::from([0, 1, 2, 3, 4])]);
/// assert_eq!(stats.assigned, 2);
/// assert_eq!(stats.singletons, 0);
/// # Ok::<(), trailhac_core::GraphError>(())
/// ```
pub fn cover_with_neighbours(
    communities: &mut Vec<NodeSet>,
    graph: &Graph,
    min_support: NonZeroUsize,
) -> CoverageStats {
    let mut stats = CoverageStats::default();
    for node in uncovered_nodes(communities, graph.node_count()) {
        let target = strongest_community(communities, graph, node)
            .filter(|&(_, support)| support >= min_support.get())
            .map(|(index, _)| index);
        if let Some(community) = target.and_then(|index| communities.get_mut(index)) {
            community.insert(node);
            stats.assigned += 1;
        } else {
            communities.push(NodeSet::from([node]));
            stats.singletons += 1;
        }
    }
    stats
}

// Index and neighbour count of the unique best community, if one exists.
fn strongest_community(
    communities: &[NodeSet],
    graph: &Graph,
    node: usize,
) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    let mut tied = false;
    for (index, community) in communities.iter().enumerate() {
        let support = graph
            .neighbours(node)
            .filter(|neighbour| community.contains(neighbour))
            .count();
        match best {
            Some((_, top)) if support < top => {}
            Some((_, top)) if support == top => tied = true,
            _ => {
                best = Some((index, support));
                tied = false;
            }
        }
    }
    if tied { None } else { best }
}

/// Gives every uncovered node its own singleton community.
///
/// Returns the number of singletons added.
pub fn cover_with_singletons(communities: &mut Vec<NodeSet>, node_count: usize) -> usize {
    let missing = uncovered_nodes(communities, node_count);
    let added = missing.len();
    communities.extend(missing.into_iter().map(|node| NodeSet::from([node])));
    added
}
