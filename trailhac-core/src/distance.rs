//! Dense node-to-node distance matrix supplied by the caller.
//!
//! The matrix is produced outside this crate (typically a closed-trail
//! distance between every pair of graph nodes) and is validated once at
//! construction: square, finite, non-negative and symmetric. After that it is
//! read-only and every lookup is an index into a row-major buffer.

use crate::error::DistanceMatrixError;

/// Validated, symmetric `N × N` matrix of node distances.
///
/// # Examples
/// ```
/// use trailhac_core::DistanceMatrix;
///
/// let matrix = DistanceMatrix::try_from_rows(vec![
///     vec![0.0, 2.0, 4.0],
///     vec![2.0, 0.0, 1.0],
///     vec![4.0, 1.0, 0.0],
/// ])?;
/// assert_eq!(matrix.size(), 3);
/// assert_eq!(matrix.get(0, 2), Some(4.0));
/// assert_eq!(matrix.get(3, 0), None);
/// # Ok::<(), trailhac_core::DistanceMatrixError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds a matrix from a row-major buffer of `size * size` values.
    ///
    /// # Errors
    /// Returns [`DistanceMatrixError::Empty`] for `size == 0`,
    /// [`DistanceMatrixError::NotSquare`] when the buffer length differs from
    /// `size * size`, and the entry-level errors described on
    /// [`DistanceMatrixError`] when a value is non-finite, negative, or
    /// breaks symmetry.
    pub fn try_new(size: usize, values: Vec<f64>) -> Result<Self, DistanceMatrixError> {
        if size == 0 {
            return Err(DistanceMatrixError::Empty);
        }
        let expected = size.checked_mul(size).ok_or(DistanceMatrixError::NotSquare {
            size,
            expected: usize::MAX,
            actual: values.len(),
        })?;
        if values.len() != expected {
            return Err(DistanceMatrixError::NotSquare {
                size,
                expected,
                actual: values.len(),
            });
        }
        let matrix = Self { size, values };
        matrix.validate_entries()?;
        Ok(matrix)
    }

    /// Builds a matrix from one vector per row.
    ///
    /// # Errors
    /// Returns [`DistanceMatrixError::RaggedRow`] when a row's length differs
    /// from the number of rows, plus the errors of [`Self::try_new`].
    pub fn try_from_rows(rows: Vec<Vec<f64>>) -> Result<Self, DistanceMatrixError> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size.saturating_mul(size));
        for (row, entries) in rows.into_iter().enumerate() {
            if entries.len() != size {
                return Err(DistanceMatrixError::RaggedRow {
                    row,
                    expected: size,
                    actual: entries.len(),
                });
            }
            values.extend(entries);
        }
        Self::try_new(size, values)
    }

    fn validate_entries(&self) -> Result<(), DistanceMatrixError> {
        for row in 0..self.size {
            for col in 0..self.size {
                let value = self.at(row, col);
                if !value.is_finite() {
                    return Err(DistanceMatrixError::NonFinite { row, col });
                }
                if value < 0.0 {
                    return Err(DistanceMatrixError::Negative { row, col, value });
                }
            }
        }
        // Entries are finite here, so `!=` is numeric and `-0.0 == 0.0`.
        for row in 0..self.size {
            for col in row + 1..self.size {
                if self.at(row, col) != self.at(col, row) {
                    return Err(DistanceMatrixError::Asymmetric { row, col });
                }
            }
        }
        Ok(())
    }

    /// Returns the side length `N`.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `d(row, col)` when both indices are in range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.size || col >= self.size {
            return None;
        }
        Some(self.at(row, col))
    }

    /// Returns row `row` as a slice.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let start = row.checked_mul(self.size)?;
        self.values.get(start..start.checked_add(self.size)?)
    }

    /// Returns the row-major backing buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Unchecked lookup for indices validated by the caller.
    pub(crate) fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size + col]
    }
}
