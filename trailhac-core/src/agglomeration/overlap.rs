//! Pairwise cluster distance with the clique-overlap discount.
//!
//! The raw distance is a linkage statistic over the nodes that belong to
//! exactly one of the two clusters. When the clusters share nodes the raw
//! distance is divided by `1 + ω`, where `ω` is the size of the largest clique
//! in their shared structure, plus (for weighted runs) the heaviest such
//! clique's share of the total graph weight.

use crate::{
    cliques::OverlapSubgraph,
    distance::DistanceMatrix,
    graph::{Graph, NodeSet},
};

use super::{LinkageMethod, cluster::ClusterRecord};

/// Evaluates the distance rule for one pair of clusters.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PairDistance<'a> {
    graph: &'a Graph,
    distances: &'a DistanceMatrix,
    method: LinkageMethod,
    use_edge_weights: bool,
}

impl<'a> PairDistance<'a> {
    pub(crate) fn new(
        graph: &'a Graph,
        distances: &'a DistanceMatrix,
        method: LinkageMethod,
        use_edge_weights: bool,
    ) -> Self {
        Self {
            graph,
            distances,
            method,
            use_edge_weights,
        }
    }

    #[expect(clippy::float_arithmetic, reason = "the discount divides a distance")]
    pub(crate) fn between(&self, left: &ClusterRecord, right: &ClusterRecord) -> f64 {
        let shared: NodeSet = left.nodes.intersection(&right.nodes).copied().collect();
        let only_left: Vec<usize> = left.nodes.difference(&shared).copied().collect();
        let only_right: Vec<usize> = right.nodes.difference(&shared).copied().collect();
        if only_left.is_empty() || only_right.is_empty() {
            return 0.0;
        }

        let raw = self.statistic(&only_left, &only_right);
        if shared.is_empty() {
            return raw;
        }
        raw / self.denominator(left, right, &shared)
    }

    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "linkage statistics are floating-point reductions"
    )]
    fn statistic(&self, only_left: &[usize], only_right: &[usize]) -> f64 {
        let cross = only_left.iter().flat_map(|&row| {
            only_right
                .iter()
                .map(move |&col| self.distances.at(row, col))
        });
        match self.method {
            LinkageMethod::Single => cross.fold(f64::INFINITY, f64::min),
            LinkageMethod::Complete => cross.fold(f64::NEG_INFINITY, f64::max),
            LinkageMethod::Average => {
                let count = only_left.len() * only_right.len();
                cross.sum::<f64>() / count as f64
            }
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "the denominator mixes clique sizes and weight shares"
    )]
    fn denominator(&self, left: &ClusterRecord, right: &ClusterRecord, shared: &NodeSet) -> f64 {
        let overlap = match shared.first() {
            Some(&node) if shared.len() == 1 => OverlapSubgraph::single(node),
            _ => OverlapSubgraph::from_edges(left.edges.intersection(&right.edges)),
        };
        let cliques = overlap.maximal_cliques();
        let largest = cliques.iter().map(Vec::len).max().unwrap_or(0);
        let mut denominator = 1.0 + largest as f64;

        if self.use_edge_weights {
            let heaviest = cliques
                .iter()
                .filter(|clique| clique.len() == largest)
                .map(|clique| self.clique_weight_share(clique))
                .fold(0.0, f64::max);
            denominator += heaviest;
        }
        denominator
    }

    #[expect(clippy::float_arithmetic, reason = "weight shares are float ratios")]
    fn clique_weight_share(&self, clique: &[usize]) -> f64 {
        let total = self.graph.total_weight();
        if total <= 0.0 {
            return 0.0;
        }
        let mut sum = 0.0;
        for (position, &u) in clique.iter().enumerate() {
            for &v in &clique[position + 1..] {
                sum += self.graph.weight(u, v).unwrap_or(0.0);
            }
        }
        sum / total
    }
}
