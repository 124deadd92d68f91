//! Agglomeration engine benchmarks.
//!
//! Measures the merge loop over planted-partition graphs for each linkage
//! method, with bases taken from the maximal cliques of the sampled graph.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use trailhac_benches::{
    error::BenchSetupError,
    params::AgglomerationBenchParams,
    source::{PlantedConfig, PlantedInputs},
};
use trailhac_core::{AgglomerationConfig, LinkageMethod, agglomerate};

/// Seed used for all graph sampling in this benchmark.
const SEED: u64 = 42;

/// Nodes per planted group.
const GROUP_SIZE: usize = 12;

/// Planted group counts to benchmark.
const GROUP_COUNTS: &[usize] = &[4, 8, 16];

/// Linkage methods to benchmark.
const METHODS: &[LinkageMethod] = &[
    LinkageMethod::Single,
    LinkageMethod::Complete,
    LinkageMethod::Average,
];

fn agglomeration_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("agglomerate");
    group.sample_size(20);

    for &groups in GROUP_COUNTS {
        let config = PlantedConfig::communities(groups, GROUP_SIZE, SEED)?;
        let inputs = PlantedInputs::generate(&config)?;
        for &method in METHODS {
            let params = AgglomerationBenchParams {
                node_count: config.node_count(),
                base_count: inputs.bases.len(),
                method,
            };
            group.bench_with_input(
                BenchmarkId::from_parameter(&params),
                &(&inputs, method),
                |b, &(inputs, method)| {
                    b.iter(|| {
                        agglomerate(
                            &inputs.graph,
                            &inputs.distances,
                            &inputs.bases,
                            AgglomerationConfig::new(method),
                        )
                    });
                },
            );
        }
    }

    group.finish();
    Ok(())
}

fn agglomeration(c: &mut Criterion) {
    if let Err(err) = agglomeration_impl(c) {
        panic!("agglomeration benchmark setup failed: {err}");
    }
}

fn weighted_overlap_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("agglomerate_weighted_overlap");
    group.sample_size(20);

    let config = PlantedConfig::communities(8, GROUP_SIZE, SEED)?;
    let inputs = PlantedInputs::generate(&config)?;
    for weighted in [false, true] {
        let agglomeration =
            AgglomerationConfig::new(LinkageMethod::Average).with_edge_weights(weighted);
        let label = if weighted { "weighted" } else { "unweighted" };
        group.bench_with_input(BenchmarkId::from_parameter(label), &inputs, |b, inputs| {
            b.iter(|| {
                agglomerate(
                    &inputs.graph,
                    &inputs.distances,
                    &inputs.bases,
                    agglomeration,
                )
            });
        });
    }

    group.finish();
    Ok(())
}

fn weighted_overlap(c: &mut Criterion) {
    if let Err(err) = weighted_overlap_impl(c) {
        panic!("weighted overlap benchmark setup failed: {err}");
    }
}

criterion_group!(benches, agglomeration, weighted_overlap);
criterion_main!(benches);
