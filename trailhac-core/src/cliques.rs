//! Maximal-clique enumeration.
//!
//! Bron–Kerbosch with Tomita pivoting over ordered adjacency sets. The same
//! enumerator serves two callers: base derivation over the whole graph and
//! the overlap discount, which inspects the small subgraph two clusters share.
//! Isolated nodes are reported as singleton cliques.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::{EdgeKey, Graph, NodeSet};

type Adjacency = BTreeMap<usize, BTreeSet<usize>>;

/// Subgraph shared by two clusters.
///
/// Built either from a single shared node (no edges) or from the edges both
/// clusters carry, in which case only nodes incident to those edges exist.
#[derive(Clone, Debug, Default)]
pub(crate) struct OverlapSubgraph {
    adjacency: Adjacency,
}

impl OverlapSubgraph {
    pub(crate) fn single(node: usize) -> Self {
        let mut adjacency = Adjacency::new();
        adjacency.insert(node, BTreeSet::new());
        Self { adjacency }
    }

    pub(crate) fn from_edges<'a>(edges: impl IntoIterator<Item = &'a EdgeKey>) -> Self {
        let mut adjacency = Adjacency::new();
        for &(u, v) in edges {
            adjacency.entry(u).or_default().insert(v);
            adjacency.entry(v).or_default().insert(u);
        }
        Self { adjacency }
    }

    pub(crate) fn maximal_cliques(&self) -> Vec<Vec<usize>> {
        enumerate(&self.adjacency)
    }
}

/// Enumerates every maximal clique of `graph`.
///
/// Each clique is returned as an ascending node list; the list of cliques is
/// ordered by its smallest member first, which follows from the ordered
/// adjacency sets.
///
/// # Examples
/// ```
/// use trailhac_core::{Graph, maximal_cliques};
///
/// let graph = Graph::try_new(5, [(0, 1), (1, 2), (0, 2), (2, 3)])?;
/// let mut cliques = maximal_cliques(&graph);
/// cliques.sort();
/// assert_eq!(cliques, vec![vec![0, 1, 2], vec![2, 3], vec![4]]);
/// # Ok::<(), trailhac_core::GraphError>(())
/// ```
#[must_use]
pub fn maximal_cliques(graph: &Graph) -> Vec<Vec<usize>> {
    let adjacency: Adjacency = (0..graph.node_count())
        .map(|node| (node, graph.neighbours(node).collect()))
        .collect();
    enumerate(&adjacency)
}

/// Derives agglomeration bases from the maximal cliques of `graph`.
///
/// Keeps cliques with at least `min_base_size` nodes and orders them by
/// ascending size, breaking ties by lexicographic node order.
///
/// # Examples
/// ```
/// use trailhac_core::{Graph, maximal_clique_bases};
///
/// let graph = Graph::try_new(5, [(0, 1), (1, 2), (0, 2), (2, 3)])?;
/// let bases = maximal_clique_bases(&graph, 2);
/// let sizes: Vec<usize> = bases.iter().map(|base| base.len()).collect();
/// assert_eq!(sizes, vec![2, 3]);
/// # Ok::<(), trailhac_core::GraphError>(())
/// ```
#[must_use]
pub fn maximal_clique_bases(graph: &Graph, min_base_size: usize) -> Vec<NodeSet> {
    let mut cliques: Vec<Vec<usize>> = maximal_cliques(graph)
        .into_iter()
        .filter(|clique| clique.len() >= min_base_size)
        .collect();
    cliques.sort_by(|left, right| left.len().cmp(&right.len()).then_with(|| left.cmp(right)));
    cliques
        .into_iter()
        .map(|clique| clique.into_iter().collect())
        .collect()
}

fn enumerate(adjacency: &Adjacency) -> Vec<Vec<usize>> {
    let mut cliques = Vec::new();
    let candidates: BTreeSet<usize> = adjacency.keys().copied().collect();
    let mut current = Vec::new();
    expand(adjacency, &mut current, candidates, BTreeSet::new(), &mut cliques);
    cliques
}

fn expand(
    adjacency: &Adjacency,
    current: &mut Vec<usize>,
    mut candidates: BTreeSet<usize>,
    mut excluded: BTreeSet<usize>,
    cliques: &mut Vec<Vec<usize>>,
) {
    if candidates.is_empty() {
        if excluded.is_empty() && !current.is_empty() {
            let mut clique = current.clone();
            clique.sort_unstable();
            cliques.push(clique);
        }
        return;
    }

    let empty = BTreeSet::new();
    let neighbours_of = |node: usize| adjacency.get(&node).unwrap_or(&empty);

    // Tomita pivot: the node covering the most candidates.
    let pivot = candidates
        .iter()
        .chain(excluded.iter())
        .copied()
        .max_by_key(|&node| neighbours_of(node).intersection(&candidates).count());
    let pivot_neighbours = pivot.map_or(&empty, neighbours_of);
    let branches: Vec<usize> = candidates.difference(pivot_neighbours).copied().collect();

    for node in branches {
        let neighbours = neighbours_of(node);
        let next_candidates = candidates.intersection(neighbours).copied().collect();
        let next_excluded = excluded.intersection(neighbours).copied().collect();
        current.push(node);
        expand(adjacency, current, next_candidates, next_excluded, cliques);
        current.pop();
        candidates.remove(&node);
        excluded.insert(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn sorted(mut cliques: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
        cliques.sort();
        cliques
    }

    #[test]
    fn complete_graph_is_one_clique() {
        let edges = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
        let graph = Graph::try_new(4, edges).expect("graph must build");
        assert_eq!(maximal_cliques(&graph), vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn two_triangles_sharing_an_edge() {
        let graph = Graph::try_new(4, [(0, 1), (0, 2), (1, 2), (1, 3), (2, 3)])
            .expect("graph must build");
        assert_eq!(
            sorted(maximal_cliques(&graph)),
            vec![vec![0, 1, 2], vec![1, 2, 3]]
        );
    }

    #[test]
    fn empty_graph_yields_singletons() {
        let graph = Graph::try_new(3, []).expect("graph must build");
        assert_eq!(
            sorted(maximal_cliques(&graph)),
            vec![vec![0], vec![1], vec![2]]
        );
    }

    #[test]
    fn overlap_subgraph_from_single_node() {
        assert_eq!(OverlapSubgraph::single(7).maximal_cliques(), vec![vec![7]]);
    }

    #[test]
    fn overlap_subgraph_without_edges_has_no_cliques() {
        let edges: Vec<EdgeKey> = Vec::new();
        assert!(OverlapSubgraph::from_edges(&edges).maximal_cliques().is_empty());
    }

    #[test]
    fn overlap_subgraph_only_contains_incident_nodes() {
        let edges = [(2, 5), (5, 9), (2, 9), (9, 11)];
        let cliques = sorted(OverlapSubgraph::from_edges(&edges).maximal_cliques());
        assert_eq!(cliques, vec![vec![2, 5, 9], vec![9, 11]]);
    }

    #[rstest]
    #[case::all(1, vec![vec![4], vec![2, 3], vec![0, 1, 2]])]
    #[case::pairs_and_up(2, vec![vec![2, 3], vec![0, 1, 2]])]
    #[case::triangles(3, vec![vec![0, 1, 2]])]
    #[case::none(4, vec![])]
    fn bases_are_filtered_and_sorted_by_size(
        #[case] min_base_size: usize,
        #[case] expected: Vec<Vec<usize>>,
    ) {
        let graph = Graph::try_new(5, [(0, 1), (1, 2), (0, 2), (2, 3)]).expect("graph must build");
        let bases: Vec<Vec<usize>> = maximal_clique_bases(&graph, min_base_size)
            .into_iter()
            .map(|base| base.into_iter().collect())
            .collect();
        assert_eq!(bases, expected);
    }

    #[test]
    fn equal_size_bases_break_ties_lexicographically() {
        let graph = Graph::try_new(6, [(4, 5), (0, 1), (2, 3)]).expect("graph must build");
        let bases: Vec<Vec<usize>> = maximal_clique_bases(&graph, 2)
            .into_iter()
            .map(|base| base.into_iter().collect())
            .collect();
        assert_eq!(bases, vec![vec![0, 1], vec![2, 3], vec![4, 5]]);
    }
}
