//! Error types for the trailhac core library.
//!
//! Defines the input-validation errors raised while building a [`crate::Graph`]
//! or a [`crate::DistanceMatrix`], the orchestration error surfaced by
//! [`crate::Trailhac`], and a convenient result alias.

use std::fmt;

use thiserror::Error;

use crate::{agglomeration::AgglomerationError, builder::ExecutionStrategy, hierarchy::HierarchyError};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while constructing a [`crate::Graph`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// An edge referenced a node outside `[0, node_count)`.
    #[error("edge ({left}, {right}) references a node outside 0..{node_count}")]
    NodeOutOfRange {
        /// First endpoint as supplied.
        left: usize,
        /// Second endpoint as supplied.
        right: usize,
        /// Number of nodes declared for the graph.
        node_count: usize,
    },
    /// Self-loops carry no community signal and are rejected.
    #[error("self-loop on node {node} is not supported")]
    SelfLoop {
        /// Node carrying the loop.
        node: usize,
    },
    /// Edge weights must be finite and non-negative.
    #[error("edge ({left}, {right}) has invalid weight {weight}")]
    InvalidWeight {
        /// First endpoint as supplied.
        left: usize,
        /// Second endpoint as supplied.
        right: usize,
        /// Offending weight.
        weight: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// An edge referenced a node outside the declared range.
        NodeOutOfRange => NodeOutOfRange { .. } => "GRAPH_NODE_OUT_OF_RANGE",
        /// A self-loop was supplied.
        SelfLoop => SelfLoop { .. } => "GRAPH_SELF_LOOP",
        /// An edge weight was negative or non-finite.
        InvalidWeight => InvalidWeight { .. } => "GRAPH_INVALID_WEIGHT",
    }
}

/// An error produced while constructing a [`crate::DistanceMatrix`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DistanceMatrixError {
    /// The matrix contained no rows.
    #[error("distance matrix is empty")]
    Empty,
    /// The value buffer does not describe a square matrix of the stated size.
    #[error("distance matrix of size {size} needs {expected} values but {actual} were given")]
    NotSquare {
        /// Declared side length.
        size: usize,
        /// Number of values a `size × size` matrix requires.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// A row had a different length from the side length.
    #[error("row {row} has {actual} values but the matrix has {expected} columns")]
    RaggedRow {
        /// Offending row index.
        row: usize,
        /// Expected number of columns.
        expected: usize,
        /// Number of values in the row.
        actual: usize,
    },
    /// An entry was NaN or infinite.
    #[error("entry ({row}, {col}) is not finite")]
    NonFinite {
        /// Row index of the entry.
        row: usize,
        /// Column index of the entry.
        col: usize,
    },
    /// An entry was negative.
    #[error("entry ({row}, {col}) is negative ({value})")]
    Negative {
        /// Row index of the entry.
        row: usize,
        /// Column index of the entry.
        col: usize,
        /// Offending value.
        value: f64,
    },
    /// `d(row, col) != d(col, row)`.
    #[error("entries ({row}, {col}) and ({col}, {row}) differ")]
    Asymmetric {
        /// Row index of the upper-triangle entry.
        row: usize,
        /// Column index of the upper-triangle entry.
        col: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`DistanceMatrixError`] variants.
    enum DistanceMatrixErrorCode for DistanceMatrixError {
        /// The matrix contained no rows.
        Empty => Empty => "DISTANCE_MATRIX_EMPTY",
        /// The value buffer was not square.
        NotSquare => NotSquare { .. } => "DISTANCE_MATRIX_NOT_SQUARE",
        /// A row length differed from the side length.
        RaggedRow => RaggedRow { .. } => "DISTANCE_MATRIX_RAGGED_ROW",
        /// An entry was not finite.
        NonFinite => NonFinite { .. } => "DISTANCE_MATRIX_NON_FINITE",
        /// An entry was negative.
        Negative => Negative { .. } => "DISTANCE_MATRIX_NEGATIVE",
        /// The matrix was not symmetric.
        Asymmetric => Asymmetric { .. } => "DISTANCE_MATRIX_ASYMMETRIC",
    }
}

/// Error type produced when configuring or running [`crate::Trailhac`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TrailhacError {
    /// Minimum community size must be greater than zero.
    #[error("min_community_size must be at least 1 (got {got})")]
    InvalidMinCommunitySize {
        /// The invalid size supplied by the caller.
        got: usize,
    },
    /// Minimum neighbour support must be greater than zero.
    #[error("min_neighbour_support must be at least 1 (got {got})")]
    InvalidNeighbourSupport {
        /// The invalid support supplied by the caller.
        got: usize,
    },
    /// The minimum merge distance must be finite and non-negative.
    #[error("min_merge_distance must be finite and non-negative (got {got})")]
    InvalidMinMergeDistance {
        /// The invalid threshold supplied by the caller.
        got: f64,
    },
    /// The expected community-count window was inverted.
    #[error("community window {min}..={max} is empty")]
    InvalidCommunityWindow {
        /// Lower bound supplied by the caller.
        min: usize,
        /// Upper bound supplied by the caller.
        max: usize,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// The agglomeration engine rejected its inputs or was cancelled.
    #[error(transparent)]
    Agglomeration(#[from] AgglomerationError),
    /// The dendrogram cut enumerator rejected its inputs.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

define_error_codes! {
    /// Stable codes describing [`TrailhacError`] variants.
    enum TrailhacErrorCode for TrailhacError {
        /// Minimum community size must be greater than zero.
        InvalidMinCommunitySize => InvalidMinCommunitySize { .. } => "TRAILHAC_INVALID_MIN_COMMUNITY_SIZE",
        /// Minimum neighbour support must be greater than zero.
        InvalidNeighbourSupport => InvalidNeighbourSupport { .. } => "TRAILHAC_INVALID_NEIGHBOUR_SUPPORT",
        /// The minimum merge distance was negative or non-finite.
        InvalidMinMergeDistance => InvalidMinMergeDistance { .. } => "TRAILHAC_INVALID_MIN_MERGE_DISTANCE",
        /// The expected community-count window was inverted.
        InvalidCommunityWindow => InvalidCommunityWindow { .. } => "TRAILHAC_INVALID_COMMUNITY_WINDOW",
        /// The requested execution strategy is unavailable in the current build.
        BackendUnavailable => BackendUnavailable { .. } => "TRAILHAC_BACKEND_UNAVAILABLE",
        /// The agglomeration engine failed.
        AgglomerationFailure => Agglomeration { .. } => "TRAILHAC_AGGLOMERATION_FAILURE",
        /// The cut enumerator failed.
        HierarchyFailure => Hierarchy { .. } => "TRAILHAC_HIERARCHY_FAILURE",
    }
}

impl TrailhacError {
    /// Retrieve the symbolic code of the wrapped stage error, when there is one.
    #[must_use]
    pub const fn stage_code(&self) -> Option<&'static str> {
        match self {
            Self::Agglomeration(error) => Some(error.code().as_str()),
            Self::Hierarchy(error) => Some(error.code().as_str()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, TrailhacError>;
