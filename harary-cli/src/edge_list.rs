//! Line-oriented `u,v,sign` edge lists.
//!
//! Generated graphs are written one edge per line, endpoints ascending and
//! the sign as `1` or `-1`. The reader is more lenient: it trims whitespace,
//! skips blank lines and accepts any non-zero integer as a sign.

use std::io::{self, BufRead, Write};

use harary_core::{GraphError, Sign, SignedEdge, SignedGraph, SnapshotLabel};
use thiserror::Error;

/// Largest node count an edge list may describe.
///
/// Node ids at or above this bound are rejected before the graph is sized.
pub const MAX_NODE_COUNT: usize = 1 << 20;

/// Errors raised while reading an edge list.
#[derive(Debug, Error)]
pub enum EdgeListError {
    /// The underlying reader failed.
    #[error("failed to read edge list: {source}")]
    Io {
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A line did not hold three comma-separated integers.
    #[error("line {line}: expected `u,v,sign`, found `{content}`")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// The offending line, trimmed.
        content: String,
    },
    /// The sign column was zero.
    #[error("line {line}: sign must be non-zero")]
    ZeroSign {
        /// One-based line number.
        line: usize,
    },
    /// A node id would size the graph beyond [`MAX_NODE_COUNT`].
    #[error("line {line}: node id {node} exceeds the limit of {limit} nodes")]
    NodeIdTooLarge {
        /// One-based line number.
        line: usize,
        /// The offending node id.
        node: usize,
        /// Maximum supported node count.
        limit: usize,
    },
    /// The edge could not be added to the graph.
    #[error("line {line}: {source}")]
    Graph {
        /// One-based line number.
        line: usize,
        /// Rejection raised by the graph store.
        #[source]
        source: GraphError,
    },
    /// The input contained no edges.
    #[error("edge list contains no edges")]
    Empty,
}

/// Writes `edges` as `u,v,sign` lines.
///
/// # Errors
/// Returns [`io::Error`] if writing fails.
///
/// # Examples
/// ```
/// use harary_cli::edge_list::write_edges;
/// use harary_core::{Sign, SignedEdge};
///
/// let mut buffer = Vec::new();
/// write_edges(
///     &mut buffer,
///     &[SignedEdge::new(0, 1, Sign::Positive), SignedEdge::new(1, 2, Sign::Negative)],
/// )?;
/// assert_eq!(String::from_utf8(buffer)?, "0,1,1\n1,2,-1\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_edges(mut writer: impl Write, edges: &[SignedEdge]) -> io::Result<()> {
    for edge in edges {
        writeln!(writer, "{},{},{}", edge.source(), edge.target(), edge.sign())?;
    }
    Ok(())
}

/// Reads an edge list into a graph sized to the largest node id.
///
/// # Errors
/// Returns [`EdgeListError`] when a line is malformed, a sign is zero, a
/// node id reaches [`MAX_NODE_COUNT`], an edge is a self loop or a
/// duplicate, the reader fails, or no edge is found.
///
/// # Examples
/// ```
/// use harary_cli::edge_list::read_edges;
/// use harary_core::Sign;
///
/// let graph = read_edges("0,1,1\n\n 1 , 3 , -4\n".as_bytes())?;
/// assert_eq!(graph.node_count(), 4);
/// assert_eq!(graph.sign(1, 3), Some(Sign::Negative));
/// # Ok::<(), harary_cli::edge_list::EdgeListError>(())
/// ```
pub fn read_edges(reader: impl BufRead) -> Result<SignedGraph, EdgeListError> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.map_err(|source| EdgeListError::Io { source })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        records.push((line_number, parse_line(line_number, trimmed)?));
    }

    let (line, node) = records
        .iter()
        .map(|(line, (left, right, _))| (*line, (*left).max(*right)))
        .max_by_key(|(_, node)| *node)
        .ok_or(EdgeListError::Empty)?;
    let node_count = node
        .checked_add(1)
        .filter(|count| *count <= MAX_NODE_COUNT)
        .ok_or(EdgeListError::NodeIdTooLarge {
            line,
            node,
            limit: MAX_NODE_COUNT,
        })?;
    let mut graph = SignedGraph::with_nodes(node_count);
    for (line, (left, right, sign)) in records {
        graph
            .add_edge(left, right, sign)
            .map_err(|source| EdgeListError::Graph { line, source })?;
    }
    Ok(graph)
}

fn parse_line(line: usize, content: &str) -> Result<(usize, usize, Sign), EdgeListError> {
    let malformed = || EdgeListError::Malformed {
        line,
        content: content.to_owned(),
    };
    let mut columns = content.split(',').map(str::trim);
    let (Some(left), Some(right), Some(weight), None) =
        (columns.next(), columns.next(), columns.next(), columns.next())
    else {
        return Err(malformed());
    };
    let left = left.parse::<usize>().map_err(|_| malformed())?;
    let right = right.parse::<usize>().map_err(|_| malformed())?;
    let weight = weight.parse::<i64>().map_err(|_| malformed())?;
    let sign = Sign::from_weight(weight).ok_or(EdgeListError::ZeroSign { line })?;
    if let Some(node) = [left, right].into_iter().find(|node| *node >= MAX_NODE_COUNT) {
        return Err(EdgeListError::NodeIdTooLarge {
            line,
            node,
            limit: MAX_NODE_COUNT,
        });
    }
    Ok((left, right, sign))
}

/// File name of a single-mode graph.
///
/// # Examples
/// ```
/// use harary_cli::edge_list::single_file_name;
///
/// assert_eq!(single_file_name(30, 0.3, 0.5, 2), "graph_30_0.3_0.5_2.txt");
/// ```
#[must_use]
pub fn single_file_name(node_count: usize, density: f64, ratio: f64, instance: usize) -> String {
    format!("graph_{node_count}_{density}_{ratio}_{instance}.txt")
}

/// File name of a sequence snapshot; the baseline is labelled `0`.
///
/// # Examples
/// ```
/// use harary_cli::edge_list::sequence_file_name;
/// use harary_core::SnapshotLabel;
///
/// assert_eq!(sequence_file_name(3, SnapshotLabel::Baseline), "3_graph_0.txt");
/// assert_eq!(sequence_file_name(3, SnapshotLabel::Target(0.4)), "3_graph_0.4.txt");
/// ```
#[must_use]
pub fn sequence_file_name(instance: usize, label: SnapshotLabel) -> String {
    format!("{instance}_graph_{label}.txt")
}
