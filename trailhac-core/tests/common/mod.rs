use trailhac_core::{DistanceMatrix, Graph, NodeSet, maximal_clique_bases};
use trailhac_test_support::fixtures::{bridged_cliques, shared_edge_triangles};

/// Graph, matrix and bases handed to a pipeline run.
pub struct Inputs {
    pub graph: Graph,
    pub distances: DistanceMatrix,
    pub bases: Vec<NodeSet>,
}

impl Inputs {
    fn from_rows(node_count: usize, edges: Vec<(usize, usize)>, rows: Vec<Vec<f64>>) -> Self {
        let graph = Graph::try_new(node_count, edges).expect("fixture graph must build");
        let distances = DistanceMatrix::try_from_rows(rows).expect("fixture matrix must build");
        let bases = maximal_clique_bases(&graph, 1);
        Self {
            graph,
            distances,
            bases,
        }
    }
}

/// Triangles `{0, 1, 2}` and `{1, 2, 3}` sharing an edge.
#[must_use]
pub fn triangles() -> Inputs {
    let (edges, rows) = shared_edge_triangles();
    Inputs::from_rows(4, edges, rows)
}

/// Two five-cliques joined by the bridge `{4, 5}`.
#[must_use]
pub fn bridged() -> Inputs {
    let (edges, rows) = bridged_cliques();
    Inputs::from_rows(10, edges, rows)
}
