//! Distance matrix provider backed by Arrow arrays or Parquet files.
use std::{fs::File, path::Path};

use arrow_array::{FixedSizeListArray, RecordBatchReader};
use parquet::arrow::{ProjectionMask, arrow_reader::ParquetRecordBatchReaderBuilder};
use parquet::file::reader::ChunkReader;
use tracing::{debug, instrument};
use trailhac_core::DistanceMatrix;

use crate::errors::DenseDistanceError;
use crate::ingest::{DistanceRows, declared_width};

/// Row-major distances read from a `FixedSizeList<Float32, N>` column.
///
/// Loading only checks the Arrow layout. Squareness and the distance
/// invariants are enforced by [`Self::into_distance_matrix`].
#[derive(Debug, Clone, PartialEq)]
pub struct DenseDistanceProvider {
    name: String,
    rows: usize,
    width: usize,
    values: Vec<f64>,
}

impl DenseDistanceProvider {
    pub(crate) fn from_rows(name: impl Into<String>, rows: DistanceRows) -> Self {
        let (rows, width, values) = rows.into_parts();
        Self {
            name: name.into(),
            rows,
            width,
            values,
        }
    }

    /// Returns the label given at load time.
    #[rustfmt::skip]
    #[must_use]
    pub fn name(&self) -> &str { &self.name }

    /// Returns the number of rows read.
    #[rustfmt::skip]
    #[must_use]
    pub fn len(&self) -> usize { self.rows }

    /// Returns `true` when no rows were read.
    #[rustfmt::skip]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.rows == 0 }

    /// Returns the number of distances in each row.
    #[rustfmt::skip]
    #[must_use]
    pub fn width(&self) -> usize { self.width }

    /// Returns the row-major values widened to `f64`.
    #[rustfmt::skip]
    #[must_use]
    pub fn data(&self) -> &[f64] { &self.values }

    /// Loads distances from an Arrow [`FixedSizeListArray`].
    ///
    /// # Errors
    /// Returns [`DenseDistanceError`] when the entries are not `Float32` or a
    /// row or entry is null.
    pub fn try_from_fixed_size_list(
        name: impl Into<String>,
        array: &FixedSizeListArray,
    ) -> Result<Self, DenseDistanceError> {
        let mut rows = DistanceRows::default();
        rows.push_list(array)?;
        Ok(Self::from_rows(name, rows))
    }

    /// Loads distances from a Parquet file.
    ///
    /// # Errors
    /// Returns [`DenseDistanceError::Io`] when the file cannot be opened and
    /// the errors of [`Self::try_from_parquet_reader`].
    pub fn try_from_parquet_path(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        column: &str,
    ) -> Result<Self, DenseDistanceError> {
        let file = File::open(path)?;
        Self::try_from_parquet_reader(name, file, column)
    }

    /// Loads distances from a Parquet reader, projecting only `column`.
    ///
    /// # Errors
    /// Returns [`DenseDistanceError::ColumnNotFound`] when `column` is
    /// missing, a schema error when it is not a non-nullable
    /// `FixedSizeList<Float32, _>`, and a row error for null entries.
    #[instrument(
        name = "providers.dense.load",
        err,
        skip(name, reader),
    )]
    pub fn try_from_parquet_reader<R>(
        name: impl Into<String>,
        reader: R,
        column: &str,
    ) -> Result<Self, DenseDistanceError>
    where
        R: ChunkReader + Send + 'static,
    {
        let builder = ParquetRecordBatchReaderBuilder::try_new(reader)?;
        let mask = ProjectionMask::columns(builder.parquet_schema(), [column]);
        let batches = builder.with_projection(mask).build()?;
        let schema = batches.schema();
        let column_index =
            schema
                .index_of(column)
                .map_err(|_| DenseDistanceError::ColumnNotFound {
                    column: column.to_owned(),
                })?;
        let mut rows = DistanceRows::with_width(declared_width(schema.field(column_index))?);
        for batch in batches {
            rows.push_column(batch?.column(column_index), column)?;
        }
        let provider = Self::from_rows(name, rows);
        debug!(rows = provider.rows, width = provider.width, "distance rows loaded");
        Ok(provider)
    }

    /// Validates the loaded rows into a [`DistanceMatrix`].
    ///
    /// # Errors
    /// Returns [`DenseDistanceError::NotSquare`] when the row count differs
    /// from the row width and [`DenseDistanceError::Matrix`] when an entry
    /// is negative, non-finite or breaks symmetry.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array};
    /// use arrow_schema::{DataType, Field};
    /// use trailhac_providers_dense::DenseDistanceProvider;
    ///
    /// let values = Float32Array::from(vec![0.0, 2.0, 2.0, 0.0]);
    /// let array = FixedSizeListArray::new(
    ///     Arc::new(Field::new("item", DataType::Float32, false)),
    ///     2,
    ///     Arc::new(values) as ArrayRef,
    ///     None,
    /// );
    /// let matrix = DenseDistanceProvider::try_from_fixed_size_list("demo", &array)?
    ///     .into_distance_matrix()?;
    /// assert_eq!(matrix.get(0, 1), Some(2.0));
    /// # Ok::<(), trailhac_providers_dense::DenseDistanceError>(())
    /// ```
    pub fn into_distance_matrix(self) -> Result<DistanceMatrix, DenseDistanceError> {
        if self.rows != self.width {
            return Err(DenseDistanceError::NotSquare {
                rows: self.rows,
                width: self.width,
            });
        }
        Ok(DistanceMatrix::try_new(self.rows, self.values)?)
    }
}
