//! Shared test utilities for `trailhac-core`.

use proptest::{prelude::*, test_runner::Config as ProptestConfig};
use trailhac_test_support::{
    ci::property_test_profile::ProptestRunProfile,
    fixtures::{PlantedPartition, hop_distance_rows},
};

use crate::{DistanceMatrix, Graph, NodeSet, maximal_clique_bases};

/// Builds a proptest configuration from the shared run profile.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    config_for(ProptestRunProfile::load(default_cases, false))
}

/// Like [`suite_proptest_config`] but runs `1 / divisor` of the cases, for
/// properties that agglomerate and then walk every level.
#[must_use]
pub(crate) fn per_level_proptest_config(default_cases: u32, divisor: u32) -> ProptestConfig {
    config_for(ProptestRunProfile::load(default_cases, false).scaled_down(divisor))
}

fn config_for(profile: ProptestRunProfile) -> ProptestConfig {
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Graph, hop-distance matrix and clique bases sampled together.
#[derive(Clone, Debug)]
pub(crate) struct Scenario {
    pub(crate) graph: Graph,
    pub(crate) distances: DistanceMatrix,
    pub(crate) bases: Vec<NodeSet>,
}

impl Scenario {
    /// Wraps raw edges and distance rows, panicking on malformed fixtures.
    pub(crate) fn from_parts(
        node_count: usize,
        edges: Vec<(usize, usize)>,
        rows: Vec<Vec<f64>>,
        bases: Vec<NodeSet>,
    ) -> Self {
        let graph = Graph::try_new(node_count, edges).expect("fixture graph must be valid");
        let distances = DistanceMatrix::try_from_rows(rows).expect("fixture matrix must be valid");
        Self {
            graph,
            distances,
            bases,
        }
    }

    /// Samples a planted-partition graph whose bases are its maximal cliques.
    pub(crate) fn planted(model: PlantedPartition, seed: u64) -> Self {
        let node_count = model.node_count();
        let edges = model.sample_edges(seed);
        let rows = hop_distance_rows(node_count, &edges);
        let graph = Graph::try_new(node_count, edges).expect("fixture graph must be valid");
        let bases = maximal_clique_bases(&graph, 1);
        let distances = DistanceMatrix::try_from_rows(rows).expect("fixture matrix must be valid");
        Self {
            graph,
            distances,
            bases,
        }
    }
}

/// Strategy producing small planted-partition scenarios.
pub(crate) fn scenario_strategy() -> impl Strategy<Value = Scenario> {
    (2_usize..=4, 3_usize..=6, 0.3_f64..0.9, 0.0_f64..0.15, any::<u64>()).prop_map(
        |(groups, group_size, p_in, p_out, seed)| {
            let model = PlantedPartition {
                groups,
                group_size,
                p_in,
                p_out,
            };
            Scenario::planted(model, seed)
        },
    )
}

/// Collects a slice of node lists into [`NodeSet`]s.
pub(crate) fn node_sets(lists: &[&[usize]]) -> Vec<NodeSet> {
    lists
        .iter()
        .map(|nodes| nodes.iter().copied().collect())
        .collect()
}
