//! Unit tests for the quality evaluator on small hand-computed graphs.

use rstest::{fixture, rstest};

use crate::{
    DistanceMatrix, Graph, NodeSet,
    test_utils::node_sets,
};

use super::*;

const EPSILON: f64 = 1e-12;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

/// Two triangles `{0, 1, 2}` and `{3, 4, 5}` joined by the edge `{2, 3}`.
#[fixture]
fn barbell() -> Graph {
    Graph::try_new(6, [(0, 1), (0, 2), (1, 2), (2, 3), (3, 4), (3, 5), (4, 5)])
        .expect("barbell must build")
}

#[fixture]
fn halves() -> Vec<NodeSet> {
    node_sets(&[&[0, 1, 2], &[3, 4, 5]])
}

fn hop_matrix(graph: &Graph) -> DistanceMatrix {
    let edges: Vec<(usize, usize)> = graph.edges().map(|(u, v, _)| (u, v)).collect();
    let rows = trailhac_test_support::fixtures::hop_distance_rows(graph.node_count(), &edges);
    DistanceMatrix::try_from_rows(rows).expect("hop rows must validate")
}

#[rstest]
#[case::conductance(FitnessMeasure::Conductance, 1.0 / 7.0)]
#[case::normalized_cut(FitnessMeasure::NormalizedCut, 1.0 / 7.0 + 1.0 / 9.0)]
#[case::expansion(FitnessMeasure::Expansion, 1.0 / 3.0)]
#[case::internal_edge_density(FitnessMeasure::InternalEdgeDensity, 1.0)]
#[case::cut_ratio(FitnessMeasure::CutRatio, 1.0 / 9.0)]
#[case::average_odf(FitnessMeasure::AverageOdf, 1.0 / 3.0)]
#[case::flake_odf(FitnessMeasure::FlakeOdf, 0.0)]
fn fitness_on_the_barbell(
    barbell: Graph,
    halves: Vec<NodeSet>,
    #[case] measure: FitnessMeasure,
    #[case] expected: f64,
) {
    let values = community_fitness(&barbell, &halves, measure, EdgeWeighting::Unweighted);
    assert_eq!(values.len(), 2);
    for value in values {
        assert_close(value, expected);
    }
    let report = FitnessReport::compute(&barbell, &halves, EdgeWeighting::Unweighted);
    assert_close(report.get(measure).mean, expected);
    assert_close(report.get(measure).std, 0.0);
}

#[test]
fn weighted_conductance_uses_edge_weights() {
    let graph = Graph::try_with_weights(4, [(0, 1, 2.0), (1, 2, 1.0), (2, 3, 3.0)])
        .expect("weighted graph must build");
    let community = node_sets(&[&[0, 1, 2]]);
    let weighted = community_fitness(&graph, &community, FitnessMeasure::Conductance, EdgeWeighting::Weighted);
    let unweighted =
        community_fitness(&graph, &community, FitnessMeasure::Conductance, EdgeWeighting::Unweighted);
    assert_close(weighted[0], 1.0 / 3.0);
    assert_close(unweighted[0], 1.0 / 5.0);
}

#[test]
fn flake_odf_counts_members_dominated_by_outside_edges() {
    // Node 0 has one inside neighbour and two outside ones.
    let graph = Graph::try_new(4, [(0, 1), (0, 2), (0, 3)]).expect("star must build");
    let community = node_sets(&[&[0, 1]]);
    let values = community_fitness(&graph, &community, FitnessMeasure::FlakeOdf, EdgeWeighting::Unweighted);
    assert_close(values[0], 0.5);
}

#[test]
fn singleton_communities_have_zero_density() {
    let graph = Graph::try_new(2, [(0, 1)]).expect("graph must build");
    let values = community_fitness(
        &graph,
        &node_sets(&[&[0]]),
        FitnessMeasure::InternalEdgeDensity,
        EdgeWeighting::Unweighted,
    );
    assert_eq!(values, vec![0.0]);
}

#[rstest]
fn modularity_variants_on_the_barbell(barbell: Graph, halves: Vec<NodeSet>) {
    assert_close(overlap_modularity(&barbell, &halves, EdgeWeighting::Unweighted), 7.0 / 9.0);
    assert_close(eq_modularity(&barbell, &halves), 13.0 / 49.0);
    assert_close(cao_modularity(&barbell, &halves, EdgeWeighting::Unweighted), 13.0 / 49.0);
}

#[rstest]
fn overlapping_members_are_down_weighted(barbell: Graph) {
    let communities = node_sets(&[&[0, 1, 2, 3], &[2, 3, 4, 5]]);
    let disjoint = eq_modularity(&barbell, &node_sets(&[&[0, 1, 2], &[3, 4, 5]]));
    assert!(eq_modularity(&barbell, &communities) < disjoint);
}

#[test]
fn edgeless_graphs_score_zero() {
    let graph = Graph::try_new(3, []).expect("graph must build");
    let communities = node_sets(&[&[0, 1, 2]]);
    assert_eq!(overlap_modularity(&graph, &communities, EdgeWeighting::Weighted), 0.0);
    assert_eq!(eq_modularity(&graph, &communities), 0.0);
    assert_eq!(cao_modularity(&graph, &communities, EdgeWeighting::Unweighted), 0.0);
}

#[rstest]
fn coverage_ratios_count_overlap_and_singletons(barbell: Graph) {
    let matrix = hop_matrix(&barbell);
    let communities = node_sets(&[&[0, 1, 2, 3], &[2, 3, 4], &[5]]);
    let scores = evaluate_partition(&barbell, &matrix, &communities, EdgeWeighting::Unweighted, 0, &[])
        .expect("scoring must succeed");
    assert_eq!(scores.community_count, 3);
    assert_close(scores.overlap_ratio, 8.0 / 6.0);
    assert_close(scores.unassigned_ratio, 1.0 / 6.0);
}

#[rstest]
fn diameter_and_separation_follow_the_merge_sequence(barbell: Graph, halves: Vec<NodeSet>) {
    let matrix = hop_matrix(&barbell);
    let scores = evaluate_partition(
        &barbell,
        &matrix,
        &halves,
        EdgeWeighting::Unweighted,
        1,
        &[0.5, 0.0, 3.0],
    )
    .expect("scoring must succeed");
    assert_eq!(scores.diameter, 1.0);
    assert_eq!(scores.separation_index, 3.0);
    assert_eq!(separation_index(&[0.5, 0.0, 3.0], 3, 1.0), 0.0);
    assert_eq!(separation_index(&[2.0], 0, 0.0), 0.0);
}

#[rstest]
fn silhouette_on_the_barbell(barbell: Graph, halves: Vec<NodeSet>) {
    let matrix = hop_matrix(&barbell);
    // Node 0: a = 1, b = mean(2, 3, 3) = 8/3.
    let (mean, max_mean) = overlapping_silhouette(&matrix, &halves, 6);
    let node_0 = (8.0 / 3.0 - 1.0) / (8.0 / 3.0);
    // Node 2: a = 1, b = mean(1, 2, 2) = 5/3.
    let node_2 = (5.0 / 3.0 - 1.0) / (5.0 / 3.0);
    let expected = (4.0 * node_0 + 2.0 * node_2) / 6.0;
    assert_close(mean, expected);
    assert_close(max_mean, expected);
}

#[test]
fn silhouette_is_zero_without_foreign_communities() {
    let matrix = DistanceMatrix::try_from_rows(vec![vec![0.0, 2.0], vec![2.0, 0.0]])
        .expect("matrix must build");
    assert_eq!(overlapping_silhouette(&matrix, &node_sets(&[&[0, 1]]), 2), (0.0, 0.0));
}

#[test]
fn silhouette_max_picks_the_best_owning_community() {
    let matrix = DistanceMatrix::try_from_rows(vec![
        vec![0.0, 1.0, 3.0, 4.0],
        vec![1.0, 0.0, 4.0, 4.0],
        vec![3.0, 4.0, 0.0, 4.0],
        vec![4.0, 4.0, 4.0, 0.0],
    ])
    .expect("matrix must build");
    // Node 0 belongs to {0, 1} and {0, 2}; {3} is foreign with b = 4.
    let communities = node_sets(&[&[0, 1], &[0, 2], &[3]]);
    let (mean, max_mean) = overlapping_silhouette(&matrix, &communities, 4);
    // Node 0: a = 2 gives 0.5; the best owning community has a = 1, giving 0.75.
    // Node 1: a = 1, nearest foreign mean is (1 + 4) / 2 for {0, 2}.
    let node_1 = (2.5 - 1.0) / 2.5;
    // Node 2: a = 3, nearest foreign mean is (3 + 4) / 2 for {0, 1}.
    let node_2 = (3.5 - 3.0) / 3.5;
    // Node 3 has no co-members.
    assert_close(mean, (0.5 + node_1 + node_2) / 4.0);
    assert_close(max_mean, (0.75 + node_1 + node_2) / 4.0);
}

#[test]
fn invalid_partitions_are_rejected() {
    let graph = Graph::try_new(2, [(0, 1)]).expect("graph must build");
    let matrix = DistanceMatrix::try_from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]])
        .expect("matrix must build");
    let err = evaluate_partition(&graph, &matrix, &node_sets(&[&[0, 5]]), EdgeWeighting::Unweighted, 0, &[])
        .expect_err("out-of-range node must be rejected");
    assert_eq!(err.code(), QualityErrorCode::NodeOutOfRange);

    let empty = Graph::try_new(0, []).expect("empty graph must build");
    let err = evaluate_partition(&empty, &matrix, &[], EdgeWeighting::Unweighted, 0, &[])
        .expect_err("empty graph must be rejected");
    assert_eq!(err.code().as_str(), "QUALITY_EMPTY_GRAPH");
}

#[rstest]
#[case::maximised(SelectionCriterion::Silhouette, [0.1, 0.4, 0.4, f64::NAN], Some(1))]
#[case::minimised(SelectionCriterion::Conductance, [0.3, 0.2, 0.2, 0.5], Some(1))]
#[case::nan_never_wins(SelectionCriterion::Silhouette, [f64::NAN; 4], None)]
fn selection_respects_direction_and_ties(
    #[case] criterion: SelectionCriterion,
    #[case] values: [f64; 4],
    #[case] expected: Option<usize>,
) {
    let table = values.map(|value| {
        let mut scores = PartitionScores {
            silhouette_mean: value,
            ..PartitionScores::default()
        };
        scores.fitness.conductance.mean = value;
        scores
    });
    assert_eq!(select_best(&table, criterion), expected);
}

#[test]
fn criteria_directions() {
    assert!(SelectionCriterion::default().higher_is_better());
    assert!(!SelectionCriterion::NormalizedCut.higher_is_better());
    assert_eq!(SelectionCriterion::default().as_str(), "overlap_modularity");
}
