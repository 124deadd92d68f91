//! Cut enumeration and level scoring benchmarks.
//!
//! Times the stages after agglomeration separately: expanding every level of
//! a fixed linkage into communities, scoring the resulting candidates, and
//! the full pipeline for comparison.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use std::num::NonZeroUsize;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use trailhac_benches::{
    error::BenchSetupError,
    params::EvaluationBenchParams,
    source::{PlantedConfig, PlantedInputs},
};
use trailhac_core::{
    AgglomerationConfig, CutConfig, EdgeWeighting, LinkageMethod, TrailhacBuilder, agglomerate,
    enumerate_candidates, evaluate_partition,
};

/// Seed used for all graph sampling in this benchmark.
const SEED: u64 = 42;

/// Nodes per planted group.
const GROUP_SIZE: usize = 12;

/// Planted group counts to benchmark.
const GROUP_COUNTS: &[usize] = &[4, 8, 16];

/// Minimum community size applied to every level.
const MIN_COMMUNITY_SIZE: NonZeroUsize = NonZeroUsize::MIN.saturating_add(3);

fn cut_enumeration_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("enumerate_candidates");
    group.sample_size(20);
    let cuts = CutConfig::default().with_min_community_size(MIN_COMMUNITY_SIZE);

    for &groups in GROUP_COUNTS {
        let config = PlantedConfig::communities(groups, GROUP_SIZE, SEED)?;
        let inputs = PlantedInputs::generate(&config)?;
        let linkage = agglomerate(
            &inputs.graph,
            &inputs.distances,
            &inputs.bases,
            AgglomerationConfig::new(LinkageMethod::Average),
        )?;
        let params = EvaluationBenchParams {
            node_count: config.node_count(),
            min_community_size: MIN_COMMUNITY_SIZE.get(),
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(&params),
            &(&inputs, &linkage),
            |b, &(inputs, linkage)| {
                b.iter(|| enumerate_candidates(&inputs.graph, &inputs.bases, linkage, &cuts));
            },
        );
    }

    group.finish();
    Ok(())
}

fn cut_enumeration(c: &mut Criterion) {
    if let Err(err) = cut_enumeration_impl(c) {
        panic!("cut enumeration benchmark setup failed: {err}");
    }
}

fn level_scoring_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("evaluate_levels");
    group.sample_size(20);
    let cuts = CutConfig::default().with_min_community_size(MIN_COMMUNITY_SIZE);

    for &groups in GROUP_COUNTS {
        let config = PlantedConfig::communities(groups, GROUP_SIZE, SEED)?;
        let inputs = PlantedInputs::generate(&config)?;
        let linkage = agglomerate(
            &inputs.graph,
            &inputs.distances,
            &inputs.bases,
            AgglomerationConfig::new(LinkageMethod::Average),
        )?;
        let candidates = enumerate_candidates(&inputs.graph, &inputs.bases, &linkage, &cuts)?;
        let merge_distances = linkage.distances();
        let params = EvaluationBenchParams {
            node_count: config.node_count(),
            min_community_size: MIN_COMMUNITY_SIZE.get(),
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(&params),
            &(&inputs, &candidates, &merge_distances),
            |b, &(inputs, candidates, merge_distances)| {
                b.iter(|| {
                    candidates
                        .candidates
                        .iter()
                        .map(|candidate| {
                            evaluate_partition(
                                &inputs.graph,
                                &inputs.distances,
                                &candidate.communities,
                                EdgeWeighting::Unweighted,
                                candidate.level,
                                merge_distances,
                            )
                        })
                        .collect::<Vec<_>>()
                });
            },
        );
    }

    group.finish();
    Ok(())
}

fn level_scoring(c: &mut Criterion) {
    if let Err(err) = level_scoring_impl(c) {
        panic!("level scoring benchmark setup failed: {err}");
    }
}

fn full_run_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("trailhac_run");
    group.sample_size(10);
    let trailhac = TrailhacBuilder::new()
        .with_linkage_method(LinkageMethod::Average)
        .with_min_community_size(MIN_COMMUNITY_SIZE.get())
        .build()?;

    for &groups in GROUP_COUNTS {
        let config = PlantedConfig::communities(groups, GROUP_SIZE, SEED)?;
        let inputs = PlantedInputs::generate(&config)?;
        let params = EvaluationBenchParams {
            node_count: config.node_count(),
            min_community_size: MIN_COMMUNITY_SIZE.get(),
        };
        group.bench_with_input(BenchmarkId::from_parameter(&params), &inputs, |b, inputs| {
            b.iter(|| trailhac.run(&inputs.graph, &inputs.distances, &inputs.bases));
        });
    }

    group.finish();
    Ok(())
}

fn full_run(c: &mut Criterion) {
    if let Err(err) = full_run_impl(c) {
        panic!("full run benchmark setup failed: {err}");
    }
}

criterion_group!(benches, cut_enumeration, level_scoring, full_run);
criterion_main!(benches);
