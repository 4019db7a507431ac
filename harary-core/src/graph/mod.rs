//! Undirected signed graph storage.
//!
//! [`SignedGraph`] owns a fixed node range `[0, n)` and a mapping from
//! canonical node pairs to a [`Sign`]. Adjacency is kept in ordered maps so
//! edge and neighbour iteration is deterministic; a parallel slot table backs
//! uniform random edge selection in constant time.

mod union_find;

use std::{
    collections::{BTreeMap, HashMap},
    fmt, ops,
};

use crate::error::GraphError;

use self::union_find::DisjointSet;

/// Polarity carried by an edge or a triangle.
///
/// # Examples
/// ```
/// use harary_core::Sign;
///
/// assert_eq!(Sign::Negative * Sign::Negative, Sign::Positive);
/// assert_eq!(Sign::Positive.flipped(), Sign::Negative);
/// assert_eq!(Sign::Negative.as_i8(), -1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    /// A friendly relation, written as `1`.
    Positive,
    /// A hostile relation, written as `-1`.
    Negative,
}

impl Sign {
    /// Returns the opposite sign.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }

    /// Returns `1` or `-1`.
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
        }
    }

    /// Interprets any strictly positive value as [`Sign::Positive`] and any
    /// strictly negative value as [`Sign::Negative`]. Zero has no sign.
    ///
    /// # Examples
    /// ```
    /// use harary_core::Sign;
    ///
    /// assert_eq!(Sign::from_weight(3), Some(Sign::Positive));
    /// assert_eq!(Sign::from_weight(-1), Some(Sign::Negative));
    /// assert_eq!(Sign::from_weight(0), None);
    /// ```
    #[must_use]
    pub const fn from_weight(weight: i64) -> Option<Self> {
        if weight > 0 {
            Some(Self::Positive)
        } else if weight < 0 {
            Some(Self::Negative)
        } else {
            None
        }
    }

    /// Returns `true` for [`Sign::Positive`].
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Positive)
    }
}

impl ops::Mul for Sign {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        if self == rhs {
            Self::Positive
        } else {
            Self::Negative
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// Canonical unordered node pair (`low < high`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    low: usize,
    high: usize,
}

impl EdgeKey {
    /// Canonicalises `{left, right}`.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`] when both endpoints are equal.
    ///
    /// # Examples
    /// ```
    /// use harary_core::EdgeKey;
    ///
    /// let key = EdgeKey::new(4, 1).expect("distinct endpoints");
    /// assert_eq!(key.endpoints(), (1, 4));
    /// ```
    pub const fn new(left: usize, right: usize) -> Result<Self, GraphError> {
        if left == right {
            return Err(GraphError::SelfLoop { node: left });
        }
        if left < right {
            Ok(Self {
                low: left,
                high: right,
            })
        } else {
            Ok(Self {
                low: right,
                high: left,
            })
        }
    }

    /// Builds a key from endpoints already known to satisfy `low < high`.
    pub(crate) const fn ordered(low: usize, high: usize) -> Self {
        debug_assert!(low < high, "edge endpoints must be ascending");
        Self { low, high }
    }

    /// Returns the smaller endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn low(self) -> usize { self.low }

    /// Returns the larger endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn high(self) -> usize { self.high }

    /// Returns `(low, high)`.
    #[must_use]
    pub const fn endpoints(self) -> (usize, usize) {
        (self.low, self.high)
    }
}

/// An edge together with its sign, as handed to output sinks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignedEdge {
    source: usize,
    target: usize,
    sign: Sign,
}

impl SignedEdge {
    /// Creates an edge record. Endpoints are stored as given.
    #[must_use]
    pub const fn new(source: usize, target: usize, sign: Sign) -> Self {
        Self {
            source,
            target,
            sign,
        }
    }

    /// Returns the first endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn source(&self) -> usize { self.source }

    /// Returns the second endpoint.
    #[must_use]
    #[rustfmt::skip]
    pub const fn target(&self) -> usize { self.target }

    /// Returns the edge sign.
    #[must_use]
    #[rustfmt::skip]
    pub const fn sign(&self) -> Sign { self.sign }
}

/// Simple undirected graph on nodes `[0, n)` with a sign on every edge.
///
/// # Examples
/// ```
/// use harary_core::{Sign, SignedGraph};
///
/// let mut graph = SignedGraph::with_nodes(3);
/// graph.add_edge(0, 1, Sign::Positive)?;
/// graph.add_edge(1, 2, Sign::Negative)?;
/// assert_eq!(graph.edge_count(), 2);
/// assert!(graph.is_connected());
/// assert_eq!(graph.flip_edge(1, 0)?, Sign::Negative);
/// # Ok::<(), harary_core::GraphError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SignedGraph {
    node_count: usize,
    adjacency: Vec<BTreeMap<usize, Sign>>,
    edges: Vec<EdgeKey>,
    slots: HashMap<EdgeKey, usize>,
}

impl SignedGraph {
    /// Creates a graph with `node_count` nodes and no edges.
    #[must_use]
    pub fn with_nodes(node_count: usize) -> Self {
        Self {
            node_count,
            adjacency: vec![BTreeMap::new(); node_count],
            edges: Vec::new(),
            slots: HashMap::new(),
        }
    }

    /// Creates the complete graph on `node_count` nodes, asking `sign_of`
    /// for the sign of every pair `(low, high)`.
    ///
    /// # Examples
    /// ```
    /// use harary_core::{Sign, SignedGraph};
    ///
    /// let graph = SignedGraph::complete(4, |_, _| Sign::Positive);
    /// assert_eq!(graph.edge_count(), 6);
    /// assert_eq!(graph.density(), 1.0);
    /// ```
    #[must_use]
    pub fn complete(node_count: usize, mut sign_of: impl FnMut(usize, usize) -> Sign) -> Self {
        let mut graph = Self::with_nodes(node_count);
        graph.edges.reserve(max_edges(node_count));
        for low in 0..node_count {
            for high in (low + 1)..node_count {
                graph.insert_unchecked(EdgeKey { low, high }, sign_of(low, high));
            }
        }
        graph
    }

    /// Returns the number of nodes.
    #[must_use]
    #[rustfmt::skip]
    pub const fn node_count(&self) -> usize { self.node_count }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `n (n - 1) / 2`, the edge count of the complete graph.
    #[must_use]
    pub const fn max_edge_count(&self) -> usize {
        max_edges(self.node_count)
    }

    /// Returns `|E| / (n (n - 1) / 2)`, or `0.0` when fewer than two nodes
    /// exist.
    #[must_use]
    pub fn density(&self) -> f64 {
        density_of(self.edge_count(), self.node_count)
    }

    /// Returns `true` when `{left, right}` is an edge.
    #[must_use]
    pub fn contains_edge(&self, left: usize, right: usize) -> bool {
        self.sign(left, right).is_some()
    }

    /// Returns the sign of `{left, right}` if the edge exists.
    #[must_use]
    pub fn sign(&self, left: usize, right: usize) -> Option<Sign> {
        self.adjacency.get(left)?.get(&right).copied()
    }

    /// Returns the sign stored for `key` if the edge exists.
    #[must_use]
    pub fn sign_of(&self, key: EdgeKey) -> Option<Sign> {
        self.sign(key.low, key.high)
    }

    /// Inserts the edge `{left, right}` with `sign`.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`], [`GraphError::NodeOutOfRange`], or
    /// [`GraphError::DuplicateEdge`].
    pub fn add_edge(&mut self, left: usize, right: usize, sign: Sign) -> Result<(), GraphError> {
        let key = self.checked_key(left, right)?;
        if self.slots.contains_key(&key) {
            return Err(GraphError::DuplicateEdge {
                left: key.low,
                right: key.high,
            });
        }
        self.insert_unchecked(key, sign);
        Ok(())
    }

    /// Removes the edge `{left, right}` and returns its sign.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`], [`GraphError::NodeOutOfRange`], or
    /// [`GraphError::MissingEdge`].
    pub fn remove_edge(&mut self, left: usize, right: usize) -> Result<Sign, GraphError> {
        let key = self.checked_key(left, right)?;
        let slot = self.slots.remove(&key).ok_or(GraphError::MissingEdge {
            left: key.low,
            right: key.high,
        })?;
        self.edges.swap_remove(slot);
        if let Some(moved) = self.edges.get(slot) {
            self.slots.insert(*moved, slot);
        }
        let sign = self.adjacency[key.low].remove(&key.high);
        self.adjacency[key.high].remove(&key.low);
        sign.ok_or(GraphError::MissingEdge {
            left: key.low,
            right: key.high,
        })
    }

    /// Negates the sign of `{left, right}` and returns the new sign.
    ///
    /// # Errors
    /// Returns [`GraphError::SelfLoop`], [`GraphError::NodeOutOfRange`], or
    /// [`GraphError::MissingEdge`].
    pub fn flip_edge(&mut self, left: usize, right: usize) -> Result<Sign, GraphError> {
        let key = self.checked_key(left, right)?;
        let missing = GraphError::MissingEdge {
            left: key.low,
            right: key.high,
        };
        let forward = self.adjacency[key.low]
            .get_mut(&key.high)
            .ok_or_else(|| missing.clone())?;
        let flipped = forward.flipped();
        *forward = flipped;
        let backward = self.adjacency[key.high]
            .get_mut(&key.low)
            .ok_or(missing)?;
        *backward = flipped;
        Ok(flipped)
    }

    /// Returns the edge stored in random-selection slot `index`.
    ///
    /// Slots are a dense `[0, edge_count)` range whose order changes as edges
    /// are removed; use [`Self::edges`] for a stable order.
    #[must_use]
    pub fn edge_at(&self, index: usize) -> Option<EdgeKey> {
        self.edges.get(index).copied()
    }

    /// Iterates over the neighbours of `node` in ascending order together with
    /// the sign of the connecting edge. Unknown nodes yield nothing.
    pub fn neighbours(&self, node: usize) -> impl Iterator<Item = (usize, Sign)> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(|row| row.iter().map(|(&other, &sign)| (other, sign)))
    }

    /// Iterates over the neighbours of `node` whose id is greater than `node`.
    pub fn higher_neighbours(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .get(node)
            .into_iter()
            .flat_map(move |row| row.range(node.saturating_add(1)..).map(|(&other, _)| other))
    }

    /// Iterates over every edge once, ascending by `(source, target)` with
    /// `source < target`.
    pub fn edges(&self) -> impl Iterator<Item = SignedEdge> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(source, row)| {
            row.range(source.saturating_add(1)..)
                .map(move |(&target, &sign)| SignedEdge::new(source, target, sign))
        })
    }

    /// Counts connected components. Isolated nodes are components of their own.
    #[must_use]
    pub fn component_count(&self) -> usize {
        let mut components = DisjointSet::new(self.node_count);
        for edge in &self.edges {
            components.union(edge.low, edge.high);
        }
        components.components()
    }

    /// Returns `true` when every node is reachable from every other node.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.component_count() <= 1
    }

    fn checked_key(&self, left: usize, right: usize) -> Result<EdgeKey, GraphError> {
        for node in [left, right] {
            if node >= self.node_count {
                return Err(GraphError::NodeOutOfRange {
                    node,
                    node_count: self.node_count,
                });
            }
        }
        EdgeKey::new(left, right)
    }

    fn insert_unchecked(&mut self, key: EdgeKey, sign: Sign) {
        self.adjacency[key.low].insert(key.high, sign);
        self.adjacency[key.high].insert(key.low, sign);
        self.slots.insert(key, self.edges.len());
        self.edges.push(key);
    }
}

#[expect(clippy::integer_division, reason = "n (n - 1) is always even")]
pub(crate) const fn max_edges(node_count: usize) -> usize {
    node_count.saturating_mul(node_count.saturating_sub(1)) / 2
}

#[expect(
    clippy::cast_precision_loss,
    clippy::float_arithmetic,
    reason = "density is a ratio of edge counts that stay far below 2^52"
)]
pub(crate) fn density_of(edge_count: usize, node_count: usize) -> f64 {
    let max = max_edges(node_count);
    if max == 0 {
        return 0.0;
    }
    edge_count as f64 / max as f64
}

#[cfg(test)]
mod tests;
