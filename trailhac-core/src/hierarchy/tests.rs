//! Unit tests for the cut enumerator.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rstest::rstest;

use crate::{
    AgglomerationConfig, ClusterId, LinkageRecord, agglomerate,
    test_utils::{
        Scenario, node_sets, per_level_proptest_config, scenario_strategy, suite_proptest_config,
    },
};

use super::*;

fn record(left: u64, right: u64, distance: f64) -> LinkageRecord {
    LinkageRecord::new(ClusterId::new(left), ClusterId::new(right), distance, 2)
}

fn three_base_linkage(first: f64, second: f64) -> Linkage {
    Linkage::try_new(3, vec![record(0, 1, first), record(3, 2, second)])
        .expect("linkage must validate")
}

fn permissive() -> CutConfig {
    CutConfig::default().with_min_community_size(NonZeroUsize::MIN)
}

#[test]
fn rank_zero_yields_one_community_per_base() {
    let graph = Graph::try_new(6, [(0, 1), (2, 3), (4, 5)]).expect("graph must build");
    let bases = node_sets(&[&[0, 1], &[2, 3], &[4, 5]]);
    let linkage = three_base_linkage(1.0, 2.0);
    let set = enumerate_candidates(&graph, &bases, &linkage, &permissive().with_include_unmerged(true))
        .expect("enumeration must succeed");

    let first = set.candidates.first().expect("rank zero must be present");
    assert_eq!(first.level, 0);
    assert_eq!(first.distance, None);
    assert_eq!(first.communities, bases);
}

#[test]
fn final_cut_is_the_union_of_all_bases() {
    let graph = Graph::try_new(6, [(0, 1), (2, 3), (4, 5)]).expect("graph must build");
    let bases = node_sets(&[&[0, 1], &[2, 3], &[4, 5]]);
    let linkage = three_base_linkage(1.0, 2.0);
    let set = enumerate_candidates(&graph, &bases, &linkage, &permissive())
        .expect("enumeration must succeed");

    let last = set.candidates.last().expect("final level must be present");
    assert_eq!(last.level, 2);
    assert_eq!(last.communities, vec![(0..6).collect::<NodeSet>()]);
    assert_eq!(last.coverage, CoverageStats::default());
}

/// Linkage that absorbs base `k + 1` into the running cluster at step `k`.
fn caterpillar_linkage(base_count: usize) -> Linkage {
    let records = (0..base_count - 1)
        .map(|step| {
            let left = if step == 0 { 0 } else { (base_count + step - 1) as u64 };
            LinkageRecord::new(
                ClusterId::new(left),
                ClusterId::new((step + 1) as u64),
                (step + 1) as f64,
                step + 2,
            )
        })
        .collect();
    Linkage::try_new(base_count, records).expect("caterpillar must validate")
}

#[test]
fn caterpillar_cuts_shrink_by_one_cluster_per_level() {
    let base_count = 1_500;
    let linkage = caterpillar_linkage(base_count);
    let cuts = flat_cuts(&linkage, &permissive().with_include_unmerged(true));
    assert_eq!(cuts.len(), base_count);

    let mut visited = 0;
    for step in cuts {
        let LevelCut::Cut(cut) = step else {
            panic!("positive distances must not be skipped");
        };
        assert_eq!(cut.partition.cluster_count(), base_count - cut.level);
        assert_eq!(cut.partition.labels().first(), Some(&0));
        visited += 1;
    }
    assert_eq!(visited, base_count);
}

#[test]
fn flat_cuts_yields_levels_on_demand() {
    let linkage = caterpillar_linkage(4);
    let mut cuts = flat_cuts(&linkage, &permissive());
    let first = cuts.next().expect("level one must be yielded");
    assert!(matches!(first, LevelCut::Cut(FlatCut { level: 1, .. })));
    assert_eq!(cuts.len(), 2);
    let rest: CutSchedule = cuts.collect();
    let levels: Vec<usize> = rest.cuts.iter().map(|cut| cut.level).collect();
    assert_eq!(levels, vec![2, 3]);
}

#[rstest]
#[case::zero_distance(0.0, 1.0, 0.0, vec![2], SkipReason::NonPositiveDistance)]
#[case::below_minimum(0.5, 2.0, 1.0, vec![2], SkipReason::BelowMinDistance)]
fn distance_filters_skip_levels(
    #[case] first: f64,
    #[case] second: f64,
    #[case] min_distance: f64,
    #[case] kept: Vec<usize>,
    #[case] reason: SkipReason,
) {
    let linkage = three_base_linkage(first, second);
    let schedule: CutSchedule =
        flat_cuts(&linkage, &permissive().with_min_merge_distance(min_distance)).collect();
    let levels: Vec<usize> = schedule.cuts.iter().map(|cut| cut.level).collect();
    assert_eq!(levels, kept);
    assert_eq!(
        schedule.skipped,
        vec![SkippedLevel {
            level: 1,
            distance: Some(first),
            reason,
        }]
    );
}

#[test]
fn window_rejections_are_reported_as_skipped() {
    let graph = Graph::try_new(6, [(0, 1), (2, 3), (4, 5)]).expect("graph must build");
    let bases = node_sets(&[&[0, 1], &[2, 3], &[4, 5]]);
    let linkage = three_base_linkage(1.0, 2.0);
    let config = permissive().with_window(CommunityWindow::new(2, 3));
    let set = enumerate_candidates(&graph, &bases, &linkage, &config)
        .expect("enumeration must succeed");

    assert_eq!(set.candidates.len(), 1);
    assert_eq!(set.candidates[0].level, 1);
    assert_eq!(
        set.skipped,
        vec![SkippedLevel {
            level: 2,
            distance: Some(2.0),
            reason: SkipReason::CommunityCountOutsideWindow { count: 1 },
        }]
    );
}

#[test]
fn small_communities_are_dropped_before_coverage() {
    let graph = Graph::try_new(5, [(0, 1), (1, 2), (2, 3), (3, 4)]).expect("graph must build");
    let bases = node_sets(&[&[0, 1, 2], &[3, 4]]);
    let linkage = Linkage::try_new(2, vec![record(0, 1, 1.0)]).expect("linkage must validate");
    let config = CutConfig::default()
        .with_min_community_size(NonZeroUsize::new(3).expect("non-zero"))
        .with_include_unmerged(true);
    let set = enumerate_candidates(&graph, &bases, &linkage, &config)
        .expect("enumeration must succeed");

    // At rank 0 the pair {3, 4} is dropped and re-attached through node 2.
    assert_eq!(set.candidates[0].communities, vec![(0..5).collect::<NodeSet>()]);
    assert_eq!(set.candidates[0].coverage.assigned, 2);
}

#[test]
fn singleton_coverage_ignores_neighbours() {
    let graph = Graph::try_new(4, [(0, 1), (1, 2), (2, 3)]).expect("graph must build");
    let bases = node_sets(&[&[0, 1, 2], &[3]]);
    let linkage = Linkage::try_new(2, vec![record(0, 1, 1.0)]).expect("linkage must validate");
    let config = CutConfig::default()
        .with_min_community_size(NonZeroUsize::new(2).expect("non-zero"))
        .with_include_unmerged(true)
        .with_coverage(CoverageMode::Singletons);
    let set = enumerate_candidates(&graph, &bases, &linkage, &config)
        .expect("enumeration must succeed");
    assert_eq!(set.candidates[0].communities, node_sets(&[&[0, 1, 2], &[3]]));
    assert_eq!(set.candidates[0].coverage.singletons, 1);
}

#[test]
fn unmerged_bases_can_be_excluded() {
    let graph = Graph::try_new(6, [(0, 1), (2, 3), (4, 5)]).expect("graph must build");
    let bases = node_sets(&[&[0, 1], &[2, 3], &[4, 5]]);
    let linkage = three_base_linkage(1.0, 2.0);
    let config = permissive()
        .with_drop_unmerged_bases(true)
        .with_coverage(CoverageMode::Singletons);
    let set = enumerate_candidates(&graph, &bases, &linkage, &config)
        .expect("enumeration must succeed");
    assert_eq!(set.candidates[0].communities, node_sets(&[&[0, 1, 2, 3], &[4], &[5]]));
}

#[rstest]
#[case::count(node_sets(&[&[0, 1]]), HierarchyErrorCode::BaseCountMismatch)]
#[case::range(node_sets(&[&[0, 1], &[2, 3], &[4, 9]]), HierarchyErrorCode::NodeOutOfRange)]
fn malformed_inputs_are_rejected(#[case] bases: Vec<NodeSet>, #[case] expected: HierarchyErrorCode) {
    let graph = Graph::try_new(6, [(0, 1)]).expect("graph must build");
    let err = enumerate_candidates(&graph, &bases, &three_base_linkage(1.0, 2.0), &permissive())
        .expect_err("inputs must be rejected");
    assert_eq!(err.code(), expected);
}

#[test]
fn cut_past_the_final_merge_is_rejected() {
    let err = cut_at(&three_base_linkage(1.0, 2.0), 3).expect_err("level 3 does not exist");
    assert_eq!(err, HierarchyError::LevelOutOfRange { level: 3, merges: 2 });
    assert_eq!(err.code().as_str(), "HIERARCHY_LEVEL_OUT_OF_RANGE");
}

fn agglomerated(scenario: &Scenario) -> Result<Linkage, TestCaseError> {
    agglomerate(
        &scenario.graph,
        &scenario.distances,
        &scenario.bases,
        AgglomerationConfig::default(),
    )
    .map_err(|error| TestCaseError::fail(error.to_string()))
}

proptest! {
    #![proptest_config(suite_proptest_config(48))]

    #[test]
    fn drop_small_communities_is_idempotent(
        sizes in prop::collection::vec(0_usize..8, 0..10),
        min_size in 1_usize..6,
    ) {
        let communities: Vec<NodeSet> = sizes
            .iter()
            .enumerate()
            .map(|(index, &size)| (index * 10..index * 10 + size).collect())
            .collect();
        let once = drop_small_communities(communities, min_size);
        let twice = drop_small_communities(once.clone(), min_size);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn extreme_cuts_match_bases_and_their_union(scenario in scenario_strategy()) {
        let linkage = agglomerated(&scenario)?;
        let first = cut_at(&linkage, 0).map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert_eq!(first.cluster_count(), scenario.bases.len());

        let last = cut_at(&linkage, linkage.merge_count())
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let merged = merge_bases(&scenario.bases, &last.groups());
        let union: NodeSet = scenario.bases.iter().flatten().copied().collect();
        prop_assert_eq!(merged, vec![union]);
    }
}

proptest! {
    #![proptest_config(per_level_proptest_config(48, 4))]

    #[test]
    fn coverage_only_adds_nodes(scenario in scenario_strategy(), min_size in 1_usize..5) {
        let linkage = agglomerated(&scenario)?;
        let config = CutConfig::default()
            .with_min_community_size(NonZeroUsize::new(min_size).unwrap_or(NonZeroUsize::MIN))
            .with_include_unmerged(true);
        let schedule: CutSchedule = flat_cuts(&linkage, &config).collect();
        for cut in &schedule.cuts {
            let before = drop_small_communities(
                merge_bases(&scenario.bases, &cut.partition.groups()),
                min_size,
            );
            let CutOutcome::Candidate(candidate) =
                communities_for_cut(&scenario.graph, &scenario.bases, cut, &config)
            else {
                return Err(TestCaseError::fail("no window is configured"));
            };
            for (original, covered) in before.iter().zip(&candidate.communities) {
                prop_assert!(original.is_subset(covered));
            }
            let union: BTreeSet<usize> = candidate.communities.iter().flatten().copied().collect();
            prop_assert_eq!(union.len(), scenario.graph.node_count());
        }
    }
}
