//! Triangle enumeration and balance bookkeeping.
//!
//! A [`TriangleIndex`] is derived from a [`SignedGraph`]: it records every
//! 3-clique together with the product of its edge signs. Structural changes
//! (edge removal) require [`TriangleIndex::rebuild`]; sign flips are absorbed
//! by [`TriangleIndex::refresh_edge`], which only revisits the triangles that
//! contain the flipped edge.
//!
//! Balanced triangles are additionally kept in a dense set so a uniformly
//! random balanced triangle can be drawn in constant time.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::{
    EdgeKey, Sign, SignedGraph,
    error::{GraphError, HararyError, Result},
};

/// An unordered node triple whose three pairs are all edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triangle {
    nodes: [usize; 3],
}

impl Triangle {
    /// Builds a triangle from three distinct nodes in any order.
    ///
    /// Returns `None` when two of the nodes coincide.
    ///
    /// # Examples
    /// ```
    /// use harary_core::Triangle;
    ///
    /// let triangle = Triangle::new(5, 1, 3).expect("distinct nodes");
    /// assert_eq!(triangle.nodes(), [1, 3, 5]);
    /// assert!(Triangle::new(1, 1, 2).is_none());
    /// ```
    #[must_use]
    pub fn new(a: usize, b: usize, c: usize) -> Option<Self> {
        let mut nodes = [a, b, c];
        nodes.sort_unstable();
        let [low, mid, high] = nodes;
        (low < mid && mid < high).then_some(Self { nodes })
    }

    /// Returns the nodes in ascending order.
    #[must_use]
    #[rustfmt::skip]
    pub const fn nodes(&self) -> [usize; 3] { self.nodes }

    /// Returns the three edges of the triangle.
    #[must_use]
    pub fn edges(&self) -> [EdgeKey; 3] {
        let [a, b, c] = self.nodes;
        [
            EdgeKey::ordered(a, b),
            EdgeKey::ordered(a, c),
            EdgeKey::ordered(b, c),
        ]
    }

    /// Computes the product of the triangle's edge signs in `graph`.
    ///
    /// # Errors
    /// Returns [`GraphError::MissingEdge`] when one of the three edges is absent.
    pub fn sign_in(&self, graph: &SignedGraph) -> core::result::Result<Sign, GraphError> {
        self.edges().into_iter().try_fold(Sign::Positive, |product, edge| {
            graph
                .sign_of(edge)
                .map(|sign| product * sign)
                .ok_or(GraphError::MissingEdge {
                    left: edge.low(),
                    right: edge.high(),
                })
        })
    }
}

/// Number of balanced and unbalanced triangles sharing one edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeBalance {
    /// Triangles on the edge whose sign is positive.
    pub balanced: usize,
    /// Triangles on the edge whose sign is negative.
    pub unbalanced: usize,
}

impl EdgeBalance {
    /// Change in the unbalanced-triangle count if the edge were flipped.
    #[must_use]
    #[expect(
        clippy::cast_possible_wrap,
        reason = "per-edge triangle counts are bounded by the node count"
    )]
    pub const fn flip_gain(&self) -> isize {
        self.balanced as isize - self.unbalanced as isize
    }
}

/// Cached mapping from every triangle of a graph to its current sign.
///
/// # Examples
/// ```
/// use harary_core::{Sign, SignedGraph, TriangleIndex};
///
/// let mut graph = SignedGraph::complete(3, |_, _| Sign::Positive);
/// let mut index = TriangleIndex::rebuild(&graph);
/// assert_eq!(index.unbalanced_ratio()?, 0.0);
///
/// graph.flip_edge(0, 1)?;
/// index.refresh_edge(&graph, harary_core::EdgeKey::new(0, 1)?)?;
/// assert_eq!(index.unbalanced_ratio()?, 1.0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct TriangleIndex {
    triangles: Vec<Triangle>,
    signs: Vec<Sign>,
    by_edge: HashMap<EdgeKey, Vec<usize>>,
    balanced: Vec<usize>,
    balanced_slot: Vec<Option<usize>>,
    unbalanced: usize,
}

impl TriangleIndex {
    /// Enumerates every triangle of `graph` and records its sign.
    ///
    /// Triangles are discovered as `a < b < c` with `b, c` taken from the
    /// higher neighbours of `a` and `b` respectively, so each one is visited
    /// once and the stored order is lexicographic.
    #[must_use]
    #[instrument(
        name = "core.triangle_index.rebuild",
        skip(graph),
        fields(nodes = graph.node_count(), edges = graph.edge_count()),
    )]
    pub fn rebuild(graph: &SignedGraph) -> Self {
        let mut index = Self::default();
        for a in 0..graph.node_count() {
            for b in graph.higher_neighbours(a) {
                let Some(ab) = graph.sign(a, b) else {
                    continue;
                };
                for c in graph.higher_neighbours(b) {
                    let (Some(ac), Some(bc)) = (graph.sign(a, c), graph.sign(b, c)) else {
                        continue;
                    };
                    index.push(Triangle { nodes: [a, b, c] }, ab * ac * bc);
                }
            }
        }
        debug!(
            triangles = index.len(),
            unbalanced = index.unbalanced,
            "triangle index rebuilt"
        );
        index
    }

    /// Returns the number of triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Returns `true` when the graph has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Returns the number of triangles with sign `-1`.
    #[must_use]
    #[rustfmt::skip]
    pub const fn unbalanced_count(&self) -> usize { self.unbalanced }

    /// Returns the number of triangles with sign `+1`.
    #[must_use]
    pub fn balanced_count(&self) -> usize {
        self.balanced.len()
    }

    /// Returns the share of triangles with sign `-1`.
    ///
    /// # Errors
    /// Returns [`HararyError::UndefinedRatio`] when there are no triangles.
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "the ratio divides triangle counts that stay far below 2^52"
    )]
    pub fn unbalanced_ratio(&self) -> Result<f64> {
        if self.is_empty() {
            return Err(HararyError::UndefinedRatio);
        }
        Ok(self.unbalanced as f64 / self.len() as f64)
    }

    /// Returns the sign recorded for `triangle`, if the graph contains it.
    #[must_use]
    pub fn sign_of(&self, triangle: &Triangle) -> Option<Sign> {
        let id = self.triangles.binary_search(triangle).ok()?;
        self.signs.get(id).copied()
    }

    /// Iterates over every triangle and its sign in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (Triangle, Sign)> + '_ {
        self.triangles.iter().copied().zip(self.signs.iter().copied())
    }

    /// Iterates over the balanced triangles in no particular order.
    pub fn balanced_triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.balanced
            .iter()
            .filter_map(|&id| self.triangles.get(id).copied())
    }

    /// Returns the balanced triangle at position `index` of the balanced set,
    /// for `index` in `[0, balanced_count())`.
    #[must_use]
    pub fn balanced_at(&self, index: usize) -> Option<Triangle> {
        let id = *self.balanced.get(index)?;
        self.triangles.get(id).copied()
    }

    /// Counts balanced and unbalanced triangles containing `edge`.
    #[must_use]
    pub fn edge_balance(&self, edge: EdgeKey) -> EdgeBalance {
        let mut balance = EdgeBalance::default();
        for sign in self.triangle_ids(edge).filter_map(|id| self.signs.get(id)) {
            match sign {
                Sign::Positive => balance.balanced += 1,
                Sign::Negative => balance.unbalanced += 1,
            }
        }
        balance
    }

    /// Recomputes the sign of every triangle containing `edge` from `graph`
    /// and returns how many of them changed sign.
    ///
    /// Only valid after sign changes; removing or adding edges requires a
    /// [`Self::rebuild`].
    ///
    /// # Errors
    /// Returns [`GraphError::MissingEdge`] when an indexed triangle lost one of
    /// its edges.
    pub fn refresh_edge(
        &mut self,
        graph: &SignedGraph,
        edge: EdgeKey,
    ) -> core::result::Result<usize, GraphError> {
        let ids: Vec<usize> = self.triangle_ids(edge).collect();
        let mut changed = 0;
        for id in ids {
            let Some(triangle) = self.triangles.get(id).copied() else {
                continue;
            };
            let sign = triangle.sign_in(graph)?;
            if self.set_sign(id, sign) {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Returns `true` when a full rebuild from `graph` yields exactly the
    /// triangles and signs held by this index.
    #[must_use]
    pub fn consistent_with(&self, graph: &SignedGraph) -> bool {
        let fresh = Self::rebuild(graph);
        fresh.unbalanced == self.unbalanced
            && fresh.balanced.len() == self.balanced.len()
            && fresh.iter().eq(self.iter())
    }

    fn triangle_ids(&self, edge: EdgeKey) -> impl Iterator<Item = usize> + '_ {
        self.by_edge.get(&edge).into_iter().flatten().copied()
    }

    fn push(&mut self, triangle: Triangle, sign: Sign) {
        let id = self.triangles.len();
        for edge in triangle.edges() {
            self.by_edge.entry(edge).or_default().push(id);
        }
        self.triangles.push(triangle);
        self.signs.push(sign);
        match sign {
            Sign::Positive => {
                self.balanced_slot.push(Some(self.balanced.len()));
                self.balanced.push(id);
            }
            Sign::Negative => {
                self.balanced_slot.push(None);
                self.unbalanced += 1;
            }
        }
    }

    fn set_sign(&mut self, id: usize, sign: Sign) -> bool {
        let Some(current) = self.signs.get_mut(id) else {
            return false;
        };
        if *current == sign {
            return false;
        }
        *current = sign;
        match sign {
            Sign::Positive => {
                self.balanced_slot[id] = Some(self.balanced.len());
                self.balanced.push(id);
                self.unbalanced -= 1;
            }
            Sign::Negative => {
                if let Some(slot) = self.balanced_slot[id].take() {
                    self.balanced.swap_remove(slot);
                    if let Some(&moved) = self.balanced.get(slot) {
                        self.balanced_slot[moved] = Some(slot);
                    }
                }
                self.unbalanced += 1;
            }
        }
        true
    }
}
