//! Stable error codes exposed by the core crate.

use trailhac_core::{
    AgglomerationError, DistanceMatrixError, DistanceMatrixErrorCode, ExecutionStrategy,
    GraphError, GraphErrorCode, HierarchyError, LinkageError, LinkageErrorCode, QualityError,
    QualityErrorCode, TrailhacError, TrailhacErrorCode,
};
use rstest::rstest;

#[rstest]
#[case(GraphError::SelfLoop { node: 1 }, GraphErrorCode::SelfLoop)]
#[case(
    GraphError::NodeOutOfRange { left: 0, right: 9, node_count: 3 },
    GraphErrorCode::NodeOutOfRange,
)]
#[case(
    GraphError::InvalidWeight { left: 0, right: 1, weight: -1.0 },
    GraphErrorCode::InvalidWeight,
)]
fn returns_expected_graph_code(#[case] error: GraphError, #[case] expected: GraphErrorCode) {
    assert_eq!(error.code(), expected);
    assert!(error.code().as_str().starts_with("GRAPH_"));
}

#[rstest]
#[case(DistanceMatrixError::Empty, DistanceMatrixErrorCode::Empty)]
#[case(DistanceMatrixError::Asymmetric { row: 0, col: 1 }, DistanceMatrixErrorCode::Asymmetric)]
#[case(
    DistanceMatrixError::Negative { row: 1, col: 0, value: -2.0 },
    DistanceMatrixErrorCode::Negative,
)]
fn returns_expected_matrix_code(
    #[case] error: DistanceMatrixError,
    #[case] expected: DistanceMatrixErrorCode,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().to_string(), expected.as_str());
}

#[rstest]
#[case(LinkageError::NoBases, LinkageErrorCode::NoBases, "LINKAGE_NO_BASES")]
#[case(
    LinkageError::RecordCountMismatch { expected: 2, actual: 1 },
    LinkageErrorCode::RecordCountMismatch,
    "LINKAGE_RECORD_COUNT_MISMATCH",
)]
fn returns_expected_linkage_code(
    #[case] error: LinkageError,
    #[case] expected: LinkageErrorCode,
    #[case] symbol: &str,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), symbol);
}

#[rstest]
fn quality_codes_are_namespaced() {
    let error = QualityError::MatrixSizeMismatch { matrix: 2, nodes: 3 };
    assert_eq!(error.code(), QualityErrorCode::MatrixSizeMismatch);
    assert_eq!(error.code().as_str(), "QUALITY_MATRIX_SIZE_MISMATCH");
}

#[rstest]
#[case(
    TrailhacError::InvalidMinCommunitySize { got: 0 },
    TrailhacErrorCode::InvalidMinCommunitySize,
    None,
)]
#[case(
    TrailhacError::BackendUnavailable { requested: ExecutionStrategy::Parallel },
    TrailhacErrorCode::BackendUnavailable,
    None,
)]
#[case(
    TrailhacError::Agglomeration(AgglomerationError::EmptyBases),
    TrailhacErrorCode::AgglomerationFailure,
    Some("AGGLOMERATION_EMPTY_BASES"),
)]
#[case(
    TrailhacError::Hierarchy(HierarchyError::BaseCountMismatch { linkage: 2, bases: 3 }),
    TrailhacErrorCode::HierarchyFailure,
    Some("HIERARCHY_BASE_COUNT_MISMATCH"),
)]
fn returns_expected_trailhac_code(
    #[case] error: TrailhacError,
    #[case] expected: TrailhacErrorCode,
    #[case] stage: Option<&str>,
) {
    assert_eq!(error.code(), expected);
    assert!(error.code().as_str().starts_with("TRAILHAC_"));
    assert_eq!(error.stage_code(), stage);
}

#[rstest]
fn stage_errors_render_transparently() {
    let error = TrailhacError::from(AgglomerationError::Cancelled { completed_merges: 2 });
    assert_eq!(error.to_string(), "agglomeration cancelled after 2 merges");
}
