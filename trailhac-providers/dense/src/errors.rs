use arrow_schema::{ArrowError, DataType};
use thiserror::Error;
use trailhac_core::DistanceMatrixError;

/// Errors raised while loading a distance matrix from Arrow or Parquet.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DenseDistanceError {
    /// The requested column is absent from the file.
    #[error("distance column `{column}` is missing")]
    ColumnNotFound {
        /// Requested column name.
        column: String,
    },
    /// The column does not hold one list of distances per row.
    #[error("distance column `{column}` holds {actual:?}; expected FixedSizeList<Float32, N>")]
    NotADistanceColumn {
        /// Requested column name.
        column: String,
        /// Type found in the schema.
        actual: DataType,
    },
    /// The column or its entries are declared nullable.
    #[error("distance column `{column}` allows nulls (in entries: {nullable_entries})")]
    NullableColumn {
        /// Requested column name.
        column: String,
        /// Whether the entry field, rather than the row list, is nullable.
        nullable_entries: bool,
    },
    /// The row entries are not `Float32`.
    #[error("distance entries must be Float32 but are {actual:?}")]
    NonFloatEntries {
        /// Entry type found.
        actual: DataType,
    },
    /// The declared row width is negative.
    #[error("distance rows declare a negative width {width}")]
    NegativeWidth {
        /// Declared width.
        width: i32,
    },
    /// A whole row is null.
    #[error("distance row {row} is null")]
    MissingRow {
        /// Zero-based row index across all batches.
        row: usize,
    },
    /// A single distance is null.
    #[error("distance ({row}, {col}) is null")]
    MissingEntry {
        /// Zero-based row index across all batches.
        row: usize,
        /// Column of the first null entry in the row.
        col: usize,
    },
    /// A batch declares a different row width than the rows read before it.
    #[error("distance row {row} has width {actual}, earlier rows have width {expected}")]
    WidthChanged {
        /// First row of the offending batch.
        row: usize,
        /// Width of the earlier rows.
        expected: usize,
        /// Width of the offending batch.
        actual: usize,
    },
    /// The row-major buffer would overflow `usize`.
    #[error("{rows} distance rows of width {width} exceed addressable memory")]
    TooLarge {
        /// Rows in the offending batch.
        rows: usize,
        /// Row width.
        width: usize,
    },
    /// The row count differs from the row width.
    #[error("distance matrix has {rows} rows of width {width}; it must be square")]
    NotSquare {
        /// Rows read.
        rows: usize,
        /// Row width.
        width: usize,
    },
    /// The values do not form a valid distance matrix.
    #[error(transparent)]
    Matrix(#[from] DistanceMatrixError),
    /// Arrow rejected the data.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
    /// Parquet rejected the file.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    /// The file could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
