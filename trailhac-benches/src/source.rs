//! Planted-partition inputs for the benchmarks.
//!
//! Wraps the shared test-support generator so every bench builds its graph,
//! hop-distance matrix and clique bases the same way.

use std::num::NonZeroUsize;

use trailhac_core::{DistanceMatrix, Graph, NodeSet, maximal_clique_bases};
use trailhac_test_support::fixtures::{PlantedPartition, hop_distance_rows};

use crate::error::BenchSetupError;

/// Configuration of a planted-partition benchmark input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantedConfig {
    /// Number of planted groups.
    pub groups: NonZeroUsize,
    /// Nodes per group.
    pub group_size: NonZeroUsize,
    /// Edge probability inside a group.
    pub p_in: f64,
    /// Edge probability across groups.
    pub p_out: f64,
    /// Smallest maximal clique kept as a base.
    pub min_base_size: usize,
    /// Seed for edge sampling.
    pub seed: u64,
}

impl PlantedConfig {
    /// Returns a dense-group, sparse-bridge configuration with `groups`
    /// groups of `group_size` nodes.
    ///
    /// # Errors
    /// Returns [`BenchSetupError::ZeroValue`] when either count is zero.
    pub fn communities(
        groups: usize,
        group_size: usize,
        seed: u64,
    ) -> Result<Self, BenchSetupError> {
        Ok(Self {
            groups: NonZeroUsize::new(groups).ok_or(BenchSetupError::ZeroValue {
                context: "planted group count",
            })?,
            group_size: NonZeroUsize::new(group_size).ok_or(BenchSetupError::ZeroValue {
                context: "planted group size",
            })?,
            p_in: 0.6,
            p_out: 0.01,
            min_base_size: 3,
            seed,
        })
    }

    /// Returns the total node count.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.groups.get().saturating_mul(self.group_size.get())
    }
}

/// Graph, distances and bases generated from a [`PlantedConfig`].
#[derive(Clone, Debug)]
pub struct PlantedInputs {
    /// Sampled graph.
    pub graph: Graph,
    /// All-pairs hop distances of [`Self::graph`].
    pub distances: DistanceMatrix,
    /// Maximal cliques with at least `min_base_size` nodes.
    pub bases: Vec<NodeSet>,
}

impl PlantedInputs {
    /// Samples the graph and derives distances and bases.
    ///
    /// # Errors
    /// Returns [`BenchSetupError::Graph`] or [`BenchSetupError::Matrix`] when
    /// the generated data is rejected, and [`BenchSetupError::NoBases`] when
    /// no clique reaches the base size.
    pub fn generate(config: &PlantedConfig) -> Result<Self, BenchSetupError> {
        let model = PlantedPartition {
            groups: config.groups.get(),
            group_size: config.group_size.get(),
            p_in: config.p_in,
            p_out: config.p_out,
        };
        let node_count = model.node_count();
        let edges = model.sample_edges(config.seed);
        let distances = DistanceMatrix::try_from_rows(hop_distance_rows(node_count, &edges))?;
        let graph = Graph::try_new(node_count, edges)?;
        let bases = maximal_clique_bases(&graph, config.min_base_size);
        if bases.is_empty() {
            return Err(BenchSetupError::NoBases {
                min_base_size: config.min_base_size,
            });
        }
        Ok(Self {
            graph,
            distances,
            bases,
        })
    }
}
