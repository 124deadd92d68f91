//! Undirected graph model over contiguous node identifiers.
//!
//! Nodes are the integers `0..node_count` so they index directly into the
//! rows of a [`crate::DistanceMatrix`]. Edges are undirected and carry a
//! weight; unweighted graphs store a weight of `1.0` on every edge so the
//! weighted and unweighted quality measures share one code path.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::GraphError;

/// Ordered set of node identifiers.
///
/// Bases, clusters and communities all use this representation so iteration
/// order is deterministic.
pub type NodeSet = BTreeSet<usize>;

/// Canonical undirected edge key with the smaller endpoint first.
pub type EdgeKey = (usize, usize);

/// Returns the canonical key for the undirected edge `{u, v}`.
#[must_use]
pub const fn edge_key(u: usize, v: usize) -> EdgeKey {
    if u <= v { (u, v) } else { (v, u) }
}

/// Undirected, optionally weighted graph with nodes `0..node_count`.
///
/// # Examples
/// ```
/// use trailhac_core::Graph;
///
/// let graph = Graph::try_new(4, [(0, 1), (1, 2), (0, 2), (2, 3)])?;
/// assert_eq!(graph.node_count(), 4);
/// assert_eq!(graph.edge_count(), 4);
/// assert_eq!(graph.degree(2), 3);
/// assert!(graph.has_edge(3, 2));
/// # Ok::<(), trailhac_core::GraphError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    adjacency: Vec<BTreeMap<usize, f64>>,
    edge_count: usize,
    total_weight: f64,
    weighted: bool,
}

impl Graph {
    /// Builds an unweighted graph; every edge receives weight `1.0`.
    ///
    /// Repeated edges collapse into one.
    ///
    /// # Errors
    /// Returns [`GraphError::NodeOutOfRange`] when an endpoint is not below
    /// `node_count` and [`GraphError::SelfLoop`] for loops.
    pub fn try_new(
        node_count: usize,
        edges: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::empty(node_count, false);
        for (left, right) in edges {
            graph.insert(left, right, 1.0)?;
        }
        graph.finish();
        Ok(graph)
    }

    /// Builds a weighted graph from `(u, v, weight)` triples.
    ///
    /// Repeated edges collapse into one and keep the last weight supplied.
    ///
    /// # Errors
    /// Returns the same errors as [`Self::try_new`] plus
    /// [`GraphError::InvalidWeight`] for negative or non-finite weights.
    ///
    /// # Examples
    /// ```
    /// use trailhac_core::Graph;
    ///
    /// let graph = Graph::try_with_weights(3, [(0, 1, 2.0), (1, 2, 0.5)])?;
    /// assert!(graph.is_weighted());
    /// assert_eq!(graph.total_weight(), 2.5);
    /// assert_eq!(graph.weight(1, 0), Some(2.0));
    /// # Ok::<(), trailhac_core::GraphError>(())
    /// ```
    pub fn try_with_weights(
        node_count: usize,
        edges: impl IntoIterator<Item = (usize, usize, f64)>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::empty(node_count, true);
        for (left, right, weight) in edges {
            if !weight.is_finite() || weight < 0.0 {
                return Err(GraphError::InvalidWeight {
                    left,
                    right,
                    weight,
                });
            }
            graph.insert(left, right, weight)?;
        }
        graph.finish();
        Ok(graph)
    }

    fn empty(node_count: usize, weighted: bool) -> Self {
        Self {
            adjacency: vec![BTreeMap::new(); node_count],
            edge_count: 0,
            total_weight: 0.0,
            weighted,
        }
    }

    fn insert(&mut self, left: usize, right: usize, weight: f64) -> Result<(), GraphError> {
        let node_count = self.adjacency.len();
        if left >= node_count || right >= node_count {
            return Err(GraphError::NodeOutOfRange {
                left,
                right,
                node_count,
            });
        }
        if left == right {
            return Err(GraphError::SelfLoop { node: left });
        }
        self.adjacency[left].insert(right, weight);
        self.adjacency[right].insert(left, weight);
        Ok(())
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "total edge weight is a floating-point sum"
    )]
    fn finish(&mut self) {
        let mut edge_count = 0;
        let mut total_weight = 0.0;
        for (_, _, weight) in self.edges() {
            edge_count += 1;
            total_weight += weight;
        }
        self.edge_count = edge_count;
        self.total_weight = total_weight;
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the number of distinct undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns whether the graph was built from weighted edges.
    #[must_use]
    pub fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Returns the sum of all edge weights (the edge count when unweighted).
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Returns whether `{u, v}` is an edge.
    #[must_use]
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.weight(u, v).is_some()
    }

    /// Returns the weight of `{u, v}` when the edge exists.
    #[must_use]
    pub fn weight(&self, u: usize, v: usize) -> Option<f64> {
        self.adjacency.get(u).and_then(|row| row.get(&v)).copied()
    }

    /// Iterates over the neighbours of `node` in ascending order.
    ///
    /// Unknown nodes have no neighbours.
    pub fn neighbours(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|row| row.keys().copied())
    }

    /// Iterates over `(neighbour, weight)` pairs of `node`.
    pub fn weighted_neighbours(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|row| row.iter().map(|(&other, &weight)| (other, weight)))
    }

    /// Returns the number of neighbours of `node`.
    #[must_use]
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency.get(node).map_or(0, BTreeMap::len)
    }

    /// Returns the weighted degree (strength) of `node`.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "strength is a weight sum")]
    pub fn strength(&self, node: usize) -> f64 {
        self.adjacency
            .get(node)
            .map_or(0.0, |row| row.values().sum())
    }

    /// Iterates over every edge once as `(u, v, weight)` with `u < v`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(node, row)| {
            row.range(node + 1..)
                .map(move |(&other, &weight)| (node, other, weight))
        })
    }

    /// Returns the edges of the subgraph induced by `nodes`.
    ///
    /// # Examples
    /// ```
    /// use trailhac_core::{Graph, NodeSet};
    ///
    /// let graph = Graph::try_new(4, [(0, 1), (1, 2), (2, 3)])?;
    /// let nodes: NodeSet = [1, 2, 3].into_iter().collect();
    /// let edges: Vec<_> = graph.induced_edges(&nodes).into_iter().collect();
    /// assert_eq!(edges, vec![(1, 2), (2, 3)]);
    /// # Ok::<(), trailhac_core::GraphError>(())
    /// ```
    #[must_use]
    pub fn induced_edges(&self, nodes: &NodeSet) -> BTreeSet<EdgeKey> {
        let mut edges = BTreeSet::new();
        for &node in nodes {
            for other in self.neighbours(node) {
                if other > node && nodes.contains(&other) {
                    edges.insert((node, other));
                }
            }
        }
        edges
    }
}
