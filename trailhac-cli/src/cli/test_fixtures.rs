//! Input files shared by the CLI tests.
//!
//! Graphs come from the shared test-support fixtures and are written out in
//! the text formats the `run` command reads.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, RecordBatch};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::arrow_writer::ArrowWriter;
use tempfile::TempDir;
use trailhac_test_support::fixtures::{bridged_cliques, shared_edge_triangles};

/// Paths of one graph written to a temporary directory.
pub(super) struct GraphFiles {
    pub(super) dir: TempDir,
    pub(super) graph: PathBuf,
    pub(super) distances: PathBuf,
}

impl GraphFiles {
    pub(super) fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub(super) fn triangles_files() -> GraphFiles {
    let (edges, rows) = shared_edge_triangles();
    write_graph_files(&edges, &rows)
}

pub(super) fn bridged_files() -> GraphFiles {
    let (edges, rows) = bridged_cliques();
    write_graph_files(&edges, &rows)
}

fn write_graph_files(edges: &[(usize, usize)], rows: &[Vec<f64>]) -> GraphFiles {
    let dir = TempDir::new().expect("temp dir must be created");
    let edge_text: String = edges.iter().map(|(u, v)| format!("{u} {v}\n")).collect();
    let matrix_text: String = rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            format!("{}\n", cells.join("\t"))
        })
        .collect();
    let graph = write_file(dir.path(), "edges.txt", &edge_text).expect("edge list written");
    let distances =
        write_file(dir.path(), "distances.txt", &matrix_text).expect("distance matrix written");
    GraphFiles {
        dir,
        graph,
        distances,
    }
}

pub(super) fn write_file(dir: &Path, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

/// Writes `rows` as a `distances: FixedSizeList<Float32, N>` Parquet column.
pub(super) fn write_parquet_matrix(
    dir: &Path,
    name: &str,
    rows: &[Vec<f64>],
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let width = i32::try_from(rows.len())?;
    let values = Float32Array::from_iter_values(rows.iter().flatten().map(|&value| value as f32));
    let item_field = Arc::new(Field::new("item", DataType::Float32, false));
    let list = FixedSizeListArray::new(item_field.clone(), width, Arc::new(values) as ArrayRef, None);
    let schema = Arc::new(Schema::new(vec![Field::new(
        "distances",
        DataType::FixedSizeList(item_field, width),
        false,
    )]));
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(list) as ArrayRef])?;
    let path = dir.join(name);
    let mut writer = ArrowWriter::try_new(File::create(&path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(path)
}
