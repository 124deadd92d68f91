//! Line-based text loaders for trailhac inputs.
//!
//! Three formats are understood, all UTF-8 and whitespace separated, with
//! blank lines and `#` comments ignored:
//!
//! - edge lists: one `u v [weight]` edge per line;
//! - bases: one base per line, listing its node ids;
//! - distance matrices: one row of numbers per line.
use std::io::BufRead;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;
use trailhac_core::{DistanceMatrix, DistanceMatrixError, Graph, GraphError, NodeSet};

/// Errors produced while reading text inputs.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TextProviderError {
    /// The input contained no data lines.
    #[error("input contains no data")]
    EmptyInput,
    /// A token could not be parsed.
    #[error("line {line}: cannot parse `{token}`")]
    Parse {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// An edge line did not have two or three fields.
    #[error("line {line}: expected `u v [weight]` but found {found} fields")]
    EdgeArity {
        /// One-based line number.
        line: usize,
        /// Number of fields found.
        found: usize,
    },
    /// The edge list is not a valid graph.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// The rows do not form a valid distance matrix.
    #[error(transparent)]
    Matrix(#[from] DistanceMatrixError),
    /// Reading the input failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parses an edge list into a [`Graph`].
///
/// The node count is `node_count` when given and one more than the largest
/// id otherwise. With `weighted` set, a missing third field means weight
/// `1.0`; without it the third field is ignored.
///
/// # Errors
/// Returns [`TextProviderError::EmptyInput`] when there are no edges and no
/// explicit node count, [`TextProviderError::Parse`] or
/// [`TextProviderError::EdgeArity`] for malformed lines and
/// [`TextProviderError::Graph`] for self-loops, out-of-range ids or invalid
/// weights.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use trailhac_providers_text::parse_edge_list;
///
/// let graph = parse_edge_list(Cursor::new("# triangle\n0 1\n1 2\n0 2\n"), None, false)?;
/// assert_eq!(graph.node_count(), 3);
/// assert_eq!(graph.edge_count(), 3);
/// # Ok::<(), trailhac_providers_text::TextProviderError>(())
/// ```
pub fn parse_edge_list<R: BufRead>(
    reader: R,
    node_count: Option<usize>,
    weighted: bool,
) -> Result<Graph, TextProviderError> {
    let mut edges = Vec::new();
    for entry in data_lines(reader) {
        let (line, text) = entry?;
        let fields: Vec<&str> = text.split_whitespace().collect();
        let (left, right, weight) = match fields.as_slice() {
            [left, right] => (*left, *right, None),
            [left, right, weight] => (*left, *right, Some(*weight)),
            other => {
                return Err(TextProviderError::EdgeArity {
                    line,
                    found: other.len(),
                });
            }
        };
        let left = parse_token::<usize>(line, left)?;
        let right = parse_token::<usize>(line, right)?;
        let weight = match weight {
            Some(token) if weighted => parse_token::<f64>(line, token)?,
            _ => 1.0,
        };
        edges.push((left, right, weight));
    }

    let inferred = edges
        .iter()
        .map(|&(left, right, _)| left.max(right))
        .max()
        .map(|largest| largest + 1);
    let nodes = node_count
        .or(inferred)
        .ok_or(TextProviderError::EmptyInput)?;
    debug!(nodes, edges = edges.len(), weighted, "edge list parsed");
    let graph = if weighted {
        Graph::try_with_weights(nodes, edges)?
    } else {
        Graph::try_new(nodes, edges.into_iter().map(|(left, right, _)| (left, right)))?
    };
    Ok(graph)
}

/// Parses one base per line.
///
/// Repeated ids within a line collapse. Node ranges are not checked here;
/// the agglomeration engine validates them against the graph.
///
/// # Errors
/// Returns [`TextProviderError::EmptyInput`] when no base is listed and
/// [`TextProviderError::Parse`] for non-integer ids.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use trailhac_core::NodeSet;
/// use trailhac_providers_text::parse_bases;
///
/// let bases = parse_bases(Cursor::new("0 1 2\n2 3\n"))?;
/// assert_eq!(bases, vec![NodeSet::from([0, 1, 2]), NodeSet::from([2, 3])]);
/// # Ok::<(), trailhac_providers_text::TextProviderError>(())
/// ```
pub fn parse_bases<R: BufRead>(reader: R) -> Result<Vec<NodeSet>, TextProviderError> {
    let mut bases = Vec::new();
    for entry in data_lines(reader) {
        let (line, text) = entry?;
        let base = text
            .split_whitespace()
            .map(|token| parse_token::<usize>(line, token))
            .collect::<Result<NodeSet, _>>()?;
        bases.push(base);
    }
    if bases.is_empty() {
        return Err(TextProviderError::EmptyInput);
    }
    debug!(bases = bases.len(), "bases parsed");
    Ok(bases)
}

/// Parses a square distance matrix, one row per line.
///
/// # Errors
/// Returns [`TextProviderError::EmptyInput`] for an input without rows,
/// [`TextProviderError::Parse`] for non-numeric entries and
/// [`TextProviderError::Matrix`] when the rows are ragged, negative,
/// non-finite or asymmetric.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use trailhac_providers_text::parse_distance_matrix;
///
/// let matrix = parse_distance_matrix(Cursor::new("0\t1.5\n1.5\t0\n"))?;
/// assert_eq!(matrix.get(1, 0), Some(1.5));
/// # Ok::<(), trailhac_providers_text::TextProviderError>(())
/// ```
pub fn parse_distance_matrix<R: BufRead>(reader: R) -> Result<DistanceMatrix, TextProviderError> {
    let mut rows = Vec::new();
    for entry in data_lines(reader) {
        let (line, text) = entry?;
        let row = text
            .split_whitespace()
            .map(|token| parse_token::<f64>(line, token))
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(TextProviderError::EmptyInput);
    }
    debug!(rows = rows.len(), "distance matrix parsed");
    Ok(DistanceMatrix::try_from_rows(rows)?)
}

/// Yields `(line_number, content)` for every line carrying data.
fn data_lines<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<(usize, String), TextProviderError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| match line {
            Ok(text) => {
                let content = strip_comment(&text).trim();
                (!content.is_empty()).then(|| Ok((index + 1, content.to_owned())))
            }
            Err(error) => Some(Err(TextProviderError::Io(error))),
        })
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map_or(line, |(content, _)| content)
}

fn parse_token<T: FromStr>(line: usize, token: &str) -> Result<T, TextProviderError> {
    token.parse().map_err(|_| TextProviderError::Parse {
        line,
        token: token.to_owned(),
    })
}
