//! Accumulation of distance rows from Arrow list columns.
//!
//! A square matrix of side `N` arrives as `N` list rows of width `N`, possibly
//! split across record batches. [`DistanceRows`] fixes the width from the
//! schema or the first batch, checks every later batch against it and widens
//! the entries into one row-major `f64` buffer.

use arrow_array::{Array, ArrayRef, FixedSizeListArray, Float32Array};
use arrow_schema::{DataType, Field};

use crate::errors::DenseDistanceError;

/// Returns the row width declared by a distance column's schema field.
///
/// The column must be a non-nullable `FixedSizeList` of non-nullable
/// `Float32` entries.
pub(crate) fn declared_width(field: &Field) -> Result<usize, DenseDistanceError> {
    let DataType::FixedSizeList(entry, width) = field.data_type() else {
        return Err(DenseDistanceError::NotADistanceColumn {
            column: field.name().clone(),
            actual: field.data_type().clone(),
        });
    };
    if field.is_nullable() || entry.is_nullable() {
        return Err(DenseDistanceError::NullableColumn {
            column: field.name().clone(),
            nullable_entries: entry.is_nullable(),
        });
    }
    if entry.data_type() != &DataType::Float32 {
        return Err(DenseDistanceError::NonFloatEntries {
            actual: entry.data_type().clone(),
        });
    }
    usize::try_from(*width).map_err(|_| DenseDistanceError::NegativeWidth { width: *width })
}

/// Row-major distances gathered batch by batch.
#[derive(Debug, Default)]
pub(crate) struct DistanceRows {
    width: Option<usize>,
    rows: usize,
    values: Vec<f64>,
}

impl DistanceRows {
    /// Starts an accumulator whose rows must all have `width` entries.
    pub(crate) fn with_width(width: usize) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    /// Appends the rows of a column taken from a record batch.
    pub(crate) fn push_column(
        &mut self,
        column: &ArrayRef,
        name: &str,
    ) -> Result<(), DenseDistanceError> {
        let list = column
            .as_any()
            .downcast_ref::<FixedSizeListArray>()
            .ok_or_else(|| DenseDistanceError::NotADistanceColumn {
                column: name.to_owned(),
                actual: column.data_type().clone(),
            })?;
        self.push_list(list)
    }

    /// Appends every row of `list`.
    pub(crate) fn push_list(&mut self, list: &FixedSizeListArray) -> Result<(), DenseDistanceError> {
        let value_type = list.value_type();
        if value_type != DataType::Float32 {
            return Err(DenseDistanceError::NonFloatEntries { actual: value_type });
        }
        let width = usize::try_from(list.value_length()).map_err(|_| {
            DenseDistanceError::NegativeWidth {
                width: list.value_length(),
            }
        })?;
        let expected = *self.width.get_or_insert(width);
        if expected != width {
            return Err(DenseDistanceError::WidthChanged {
                row: self.rows,
                expected,
                actual: width,
            });
        }
        let additional = list
            .len()
            .checked_mul(width)
            .ok_or(DenseDistanceError::TooLarge {
                rows: list.len(),
                width,
            })?;
        self.values.reserve(additional);
        for index in 0..list.len() {
            self.push_row(list, index)?;
        }
        Ok(())
    }

    fn push_row(&mut self, list: &FixedSizeListArray, index: usize) -> Result<(), DenseDistanceError> {
        let row = self.rows;
        if list.is_null(index) {
            return Err(DenseDistanceError::MissingRow { row });
        }
        let entries = list.value(index);
        let distances = entries
            .as_any()
            .downcast_ref::<Float32Array>()
            .ok_or_else(|| DenseDistanceError::NonFloatEntries {
                actual: entries.data_type().clone(),
            })?;
        for (col, distance) in distances.iter().enumerate() {
            let distance = distance.ok_or(DenseDistanceError::MissingEntry { row, col })?;
            self.values.push(f64::from(distance));
        }
        self.rows += 1;
        Ok(())
    }

    /// Returns `(rows, width, values)`; the width is `0` when nothing was read.
    pub(crate) fn into_parts(self) -> (usize, usize, Vec<f64>) {
        (self.rows, self.width.unwrap_or_default(), self.values)
    }
}
