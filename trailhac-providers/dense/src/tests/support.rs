//! Builders for distance columns, batches and Parquet buffers.

use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use bytes::Bytes;
use parquet::arrow::arrow_writer::ArrowWriter;

use super::DenseDistanceError;
use crate::ingest::DistanceRows;

/// Column name used by every fixture.
pub(crate) const COLUMN: &str = "distances";

/// Distances along a path `0 - 1 - 2`.
pub(crate) const PATH: [&[f32]; 3] = [&[0.0, 1.0, 2.0], &[1.0, 0.0, 1.0], &[2.0, 1.0, 0.0]];

/// Declared nullability of a distance column.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Nulls {
    pub(crate) rows: bool,
    pub(crate) entries: bool,
}

fn entry_field(nulls: Nulls) -> Arc<Field> {
    Arc::new(Field::new("item", DataType::Float32, nulls.entries))
}

fn width_i32(width: usize) -> i32 {
    i32::try_from(width).expect("fixture widths fit in i32")
}

/// Packs `rows` into a list column of the given width.
pub(crate) fn distance_list(width: usize, rows: &[&[f32]], nulls: Nulls) -> FixedSizeListArray {
    assert!(rows.iter().all(|row| row.len() == width), "ragged fixture");
    let entries = Float32Array::from_iter_values(rows.iter().flat_map(|row| row.iter().copied()));
    FixedSizeListArray::new(entry_field(nulls), width_i32(width), Arc::new(entries), None)
}

/// Schema field describing a distance column of the given width.
pub(crate) fn distance_field(width: usize, nulls: Nulls) -> Field {
    Field::new(
        COLUMN,
        DataType::FixedSizeList(entry_field(nulls), width_i32(width)),
        nulls.rows,
    )
}

/// Wraps a single column and its field in a record batch.
pub(crate) fn single_column_batch(field: Field, column: ArrayRef) -> RecordBatch {
    RecordBatch::try_new(Arc::new(Schema::new(vec![field])), vec![column]).expect("batch")
}

/// Batch holding `rows` as a non-nullable distance column.
pub(crate) fn distance_batch(width: usize, rows: &[&[f32]]) -> RecordBatch {
    let list = distance_list(width, rows, Nulls::default());
    single_column_batch(distance_field(width, Nulls::default()), Arc::new(list))
}

/// Feeds each batch's [`COLUMN`] through a fresh [`DistanceRows`].
pub(crate) fn gather(batches: &[RecordBatch]) -> Result<DistanceRows, DenseDistanceError> {
    let mut rows = DistanceRows::default();
    for batch in batches {
        let column = batch
            .column_by_name(COLUMN)
            .ok_or_else(|| DenseDistanceError::ColumnNotFound {
                column: COLUMN.to_owned(),
            })?;
        rows.push_column(column, COLUMN)?;
    }
    Ok(rows)
}

/// Serialises a record batch to an in-memory Parquet file.
pub(crate) fn parquet_bytes(batch: &RecordBatch) -> Bytes {
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None).expect("writer");
    writer.write(batch).expect("write");
    writer.close().expect("close");
    Bytes::from(buffer)
}
