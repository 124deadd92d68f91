//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of `.expect()`.

use trailhac_core::{
    AgglomerationError, DistanceMatrixError, GraphError, HierarchyError, QualityError,
    TrailhacError,
};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// The sampled edge list was rejected.
    #[error("graph construction failed: {0}")]
    Graph(#[from] GraphError),
    /// The hop-distance rows were rejected.
    #[error("distance matrix construction failed: {0}")]
    Matrix(#[from] DistanceMatrixError),
    /// Agglomeration failed while preparing a linkage.
    #[error("agglomeration failed: {0}")]
    Agglomeration(#[from] AgglomerationError),
    /// Cut enumeration failed while preparing candidates.
    #[error("cut enumeration failed: {0}")]
    Hierarchy(#[from] HierarchyError),
    /// Scoring failed while preparing a level.
    #[error("level scoring failed: {0}")]
    Quality(#[from] QualityError),
    /// The pipeline configuration was rejected.
    #[error("pipeline configuration failed: {0}")]
    Trailhac(#[from] TrailhacError),
    /// No maximal clique reached the base size.
    #[error("no maximal clique has at least {min_base_size} nodes")]
    NoBases {
        /// Requested minimum base size.
        min_base_size: usize,
    },
    /// A zero value was passed where a non-zero integer was required.
    #[error("expected a non-zero value for {context}")]
    ZeroValue {
        /// A description of the parameter that was unexpectedly zero.
        context: &'static str,
    },
}
