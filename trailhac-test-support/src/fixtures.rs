//! Synthetic graphs and distance rows for tests and benchmarks.
//!
//! Graphs follow a planted-partition model: nodes are split into equally
//! sized groups, pairs inside a group connect with probability `p_in` and
//! pairs across groups with `p_out`. Distances are BFS hop counts, which are
//! symmetric and satisfy the validation rules of the core distance matrix.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Parameters of a planted-partition graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantedPartition {
    /// Number of planted groups.
    pub groups: usize,
    /// Nodes per group.
    pub group_size: usize,
    /// Edge probability inside a group.
    pub p_in: f64,
    /// Edge probability across groups.
    pub p_out: f64,
}

impl PlantedPartition {
    /// Returns the total node count.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.groups * self.group_size
    }

    /// Returns the planted group of `node`.
    #[must_use]
    pub fn group_of(&self, node: usize) -> usize {
        node / self.group_size.max(1)
    }

    /// Samples an edge list with `seed`; every group is additionally closed
    /// into a ring so groups stay connected.
    ///
    /// # Examples
    /// ```
    /// use trailhac_test_support::fixtures::PlantedPartition;
    ///
    /// let model = PlantedPartition { groups: 3, group_size: 5, p_in: 0.8, p_out: 0.02 };
    /// let edges = model.sample_edges(7);
    /// assert!(edges.iter().all(|&(u, v)| u < v && v < model.node_count()));
    /// assert_eq!(edges, model.sample_edges(7));
    /// ```
    #[must_use]
    pub fn sample_edges(&self, seed: u64) -> Vec<(usize, usize)> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let node_count = self.node_count();
        let mut edges = Vec::new();
        for u in 0..node_count {
            for v in u + 1..node_count {
                let same_group = self.group_of(u) == self.group_of(v);
                let closes_ring = u % self.group_size == 0 && (v + 1) % self.group_size == 0;
                let ring = same_group && (v == u + 1 || closes_ring);
                let probability = if same_group { self.p_in } else { self.p_out };
                if ring || rng.gen_bool(probability.clamp(0.0, 1.0)) {
                    edges.push((u, v));
                }
            }
        }
        edges
    }
}

/// Builds the all-pairs hop-distance rows of an undirected graph.
///
/// Unreachable pairs receive `node_count` as their distance.
///
/// # Examples
/// ```
/// use trailhac_test_support::fixtures::hop_distance_rows;
///
/// let rows = hop_distance_rows(4, &[(0, 1), (1, 2)]);
/// assert_eq!(rows[0], vec![0.0, 1.0, 2.0, 4.0]);
/// assert_eq!(rows[2][0], 2.0);
/// ```
#[must_use]
pub fn hop_distance_rows(node_count: usize, edges: &[(usize, usize)]) -> Vec<Vec<f64>> {
    let mut adjacency = vec![Vec::new(); node_count];
    for &(u, v) in edges {
        adjacency[u].push(v);
        adjacency[v].push(u);
    }
    (0..node_count)
        .map(|source| {
            let mut hops = vec![None; node_count];
            hops[source] = Some(0_usize);
            let mut queue = VecDeque::from([source]);
            while let Some(node) = queue.pop_front() {
                let next = hops[node].map_or(0, |hop| hop + 1);
                for &neighbour in &adjacency[node] {
                    if hops[neighbour].is_none() {
                        hops[neighbour] = Some(next);
                        queue.push_back(neighbour);
                    }
                }
            }
            hops.into_iter()
                .map(|hop| hop.unwrap_or(node_count) as f64)
                .collect()
        })
        .collect()
}

/// Two triangles `{0, 1, 2}` and `{1, 2, 3}` sharing the edge `{1, 2}`.
///
/// All distances are `1` except `d(0, 3) = 4`.
#[must_use]
pub fn shared_edge_triangles() -> (Vec<(usize, usize)>, Vec<Vec<f64>>) {
    let edges = vec![(0, 1), (0, 2), (1, 2), (1, 3), (2, 3)];
    let rows = vec![
        vec![0.0, 1.0, 1.0, 4.0],
        vec![1.0, 0.0, 1.0, 1.0],
        vec![1.0, 1.0, 0.0, 1.0],
        vec![4.0, 1.0, 1.0, 0.0],
    ];
    (edges, rows)
}

/// Two dense five-node groups joined by a single bridge edge `{4, 5}`.
///
/// Returns the edge list and its hop-distance rows.
#[must_use]
pub fn bridged_cliques() -> (Vec<(usize, usize)>, Vec<Vec<f64>>) {
    let mut edges = Vec::new();
    for offset in [0, 5] {
        for u in offset..offset + 5 {
            for v in u + 1..offset + 5 {
                edges.push((u, v));
            }
        }
    }
    edges.push((4, 5));
    let rows = hop_distance_rows(10, &edges);
    (edges, rows)
}
