//! Modularity variants for overlapping communities.
//!
//! All three variants return `0` for graphs without edges or partitions
//! without communities. Nodes outside `0..node_count` are ignored.

use crate::graph::{Graph, NodeSet};

use super::fitness::{CommunityProfile, EdgeWeighting, comb2, ratio};

fn memberships(communities: &[NodeSet], node_count: usize) -> Vec<usize> {
    let mut counts = vec![0_usize; node_count];
    for &node in communities.iter().flatten() {
        if let Some(count) = counts.get_mut(node) {
            *count += 1;
        }
    }
    counts
}

/// Affiliation-normalised overlapping modularity.
///
/// For each community `c` with at least two members, every member `i`
/// contributes `(k_in - k_out) / (d_i s_i)` where `s_i` counts the
/// communities containing `i`. The mean contribution is scaled by the
/// internal edge density of `c`, and the result is averaged over all
/// communities.
///
/// # Examples
/// ```
/// use trailhac_core::{EdgeWeighting, Graph, NodeSet, overlap_modularity};
///
/// let graph = Graph::try_new(3, [(0, 1), (1, 2), (0, 2)])?;
/// let whole: Vec<NodeSet> = vec![[0, 1, 2].into()];
/// assert_eq!(overlap_modularity(&graph, &whole, EdgeWeighting::Unweighted), 1.0);
/// # Ok::<(), trailhac_core::GraphError>(())
/// ```
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "modularity is a floating-point score"
)]
pub fn overlap_modularity(graph: &Graph, communities: &[NodeSet], weighting: EdgeWeighting) -> f64 {
    if communities.is_empty() || weighting.total(graph) <= 0.0 {
        return 0.0;
    }
    let affiliations = memberships(communities, graph.node_count());
    let mut total = 0.0;
    for community in communities {
        if community.len() <= 1 {
            continue;
        }
        let profile = CommunityProfile::new(graph, community, weighting);
        let contributions: f64 = community
            .iter()
            .zip(profile.member_internal.iter().zip(&profile.member_external))
            .map(|(&node, (inside, outside))| {
                let shared = affiliations.get(node).copied().unwrap_or(1) as f64;
                ratio(inside - outside, weighting.degree(graph, node) * shared)
            })
            .sum();
        let density = ratio(profile.internal, comb2(community.len()));
        total += contributions / community.len() as f64 * density;
    }
    total / communities.len() as f64
}

/// Extended modularity (EQ) with unweighted adjacency.
///
/// Sums `(A_ij - k_i k_j / 2m) / (O_i O_j)` over unordered member pairs of
/// every community, where `O_i` counts the communities containing `i`, and
/// divides by `2m`.
///
/// # Examples
/// ```
/// use trailhac_core::{Graph, NodeSet, eq_modularity};
///
/// let graph = Graph::try_new(4, [(0, 1), (2, 3)])?;
/// let communities: Vec<NodeSet> = vec![[0, 1].into(), [2, 3].into()];
/// assert_eq!(eq_modularity(&graph, &communities), 0.375);
/// # Ok::<(), trailhac_core::GraphError>(())
/// ```
#[must_use]
#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "modularity is a floating-point score"
)]
pub fn eq_modularity(graph: &Graph, communities: &[NodeSet]) -> f64 {
    let two_m = 2.0 * graph.edge_count() as f64;
    if communities.is_empty() || two_m <= 0.0 {
        return 0.0;
    }
    let overlaps = memberships(communities, graph.node_count());
    let mut q = 0.0;
    for community in communities {
        let members: Vec<usize> = community.iter().copied().collect();
        for (position, &left) in members.iter().enumerate() {
            for &right in members.iter().skip(position + 1) {
                let adjacency = if graph.has_edge(left, right) { 1.0 } else { 0.0 };
                let expected = graph.degree(left) as f64 * graph.degree(right) as f64 / two_m;
                let shared = overlaps.get(left).copied().unwrap_or(1) as f64
                    * overlaps.get(right).copied().unwrap_or(1) as f64;
                q += ratio(adjacency - expected, shared);
            }
        }
    }
    q / two_m
}

/// Belonging-coefficient modularity.
///
/// A node's coefficient for community `c` is its degree inside `c` divided by
/// the sum of its inside degrees over every community (`0` when that sum is
/// zero). Sums `(w_ij - k_i k_j / 2m) U_ic U_jc` over unordered member pairs
/// of every community and divides by `2m`.
///
/// # Examples
/// ```
/// use trailhac_core::{EdgeWeighting, Graph, NodeSet, cao_modularity};
///
/// let graph = Graph::try_new(4, [(0, 1), (2, 3)])?;
/// let communities: Vec<NodeSet> = vec![[0, 1].into(), [2, 3].into()];
/// assert_eq!(cao_modularity(&graph, &communities, EdgeWeighting::Unweighted), 0.375);
/// # Ok::<(), trailhac_core::GraphError>(())
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "modularity is a floating-point score"
)]
pub fn cao_modularity(graph: &Graph, communities: &[NodeSet], weighting: EdgeWeighting) -> f64 {
    let two_m = 2.0 * weighting.total(graph);
    if communities.is_empty() || two_m <= 0.0 {
        return 0.0;
    }
    let profiles: Vec<CommunityProfile> = communities
        .iter()
        .map(|community| CommunityProfile::new(graph, community, weighting))
        .collect();

    let mut row_sums = vec![0.0; graph.node_count()];
    for (community, profile) in communities.iter().zip(&profiles) {
        for (&node, inside) in community.iter().zip(&profile.member_internal) {
            if let Some(sum) = row_sums.get_mut(node) {
                *sum += inside;
            }
        }
    }

    let mut q = 0.0;
    for (community, profile) in communities.iter().zip(&profiles) {
        let members: Vec<(usize, f64)> = community
            .iter()
            .zip(&profile.member_internal)
            .map(|(&node, &inside)| {
                let belonging = row_sums.get(node).map_or(0.0, |&sum| ratio(inside, sum));
                (node, belonging)
            })
            .collect();
        for (position, &(left, left_belonging)) in members.iter().enumerate() {
            for &(right, right_belonging) in members.iter().skip(position + 1) {
                let weight = graph
                    .weight(left, right)
                    .map_or(0.0, |weight| weighting.apply(weight));
                let expected =
                    weighting.degree(graph, left) * weighting.degree(graph, right) / two_m;
                q += (weight - expected) * left_belonging * right_belonging;
            }
        }
    }
    q / two_m
}
