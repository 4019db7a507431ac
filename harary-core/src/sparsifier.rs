//! Random edge removal down to a target density.
//!
//! Edges are removed uniformly at random, with no regard for connectivity,
//! until the density drops to the target. Connectivity is checked once at the
//! end; a disconnected result is reported as a failure and never repaired.

use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::{
    SignedGraph,
    error::{HararyError, Result},
    graph::density_of,
};

/// Summary of a successful sparsification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SparsificationReport {
    removed: usize,
    density: f64,
}

impl SparsificationReport {
    /// Number of edges removed.
    #[must_use]
    #[rustfmt::skip]
    pub const fn removed(&self) -> usize { self.removed }

    /// Density of the graph after removal.
    #[must_use]
    #[rustfmt::skip]
    pub const fn density(&self) -> f64 { self.density }
}

/// Density of a spanning tree on `node_count` nodes, the lowest density a
/// connected graph can have. Returns `0.0` below two nodes.
///
/// # Examples
/// ```
/// use harary_core::minimum_connected_density;
///
/// assert_eq!(minimum_connected_density(4), 0.5);
/// assert_eq!(minimum_connected_density(1), 0.0);
/// ```
#[must_use]
pub fn minimum_connected_density(node_count: usize) -> f64 {
    density_of(node_count.saturating_sub(1), node_count)
}

/// Validates a density against the open interval `(0, 1)`.
pub(crate) fn validate_density(density: f64) -> Result<f64> {
    if density > 0.0 && density < 1.0 {
        Ok(density)
    } else {
        Err(HararyError::InvalidDensity { got: density })
    }
}

/// Checks that stopping at `density` can leave a spanning tree on
/// `node_count` nodes.
pub(crate) fn ensure_connectable(node_count: usize, density: f64) -> Result<()> {
    let minimum = minimum_connected_density(node_count);
    if density < minimum {
        return Err(HararyError::DensityUnreachable {
            target: density,
            minimum,
            node_count,
        });
    }
    Ok(())
}

/// Removes random edges until a target density is reached.
///
/// # Examples
/// ```
/// use harary_core::{DensitySparsifier, Sign, SignedGraph};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let sparsifier = DensitySparsifier::new(0.9)?;
/// let mut graph = SignedGraph::complete(10, |_, _| Sign::Positive);
/// let report = sparsifier.sparsify(&mut graph, &mut SmallRng::seed_from_u64(3))?;
/// assert!(report.density() <= 0.9);
/// assert_eq!(graph.edge_count(), 40);
/// # Ok::<(), harary_core::HararyError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DensitySparsifier {
    target_density: f64,
}

impl DensitySparsifier {
    /// Creates a sparsifier for `target_density`.
    ///
    /// # Errors
    /// Returns [`HararyError::InvalidDensity`] unless `0 < target_density < 1`.
    pub fn new(target_density: f64) -> Result<Self> {
        Ok(Self {
            target_density: validate_density(target_density)?,
        })
    }

    /// Returns the target density.
    #[must_use]
    #[rustfmt::skip]
    pub const fn target_density(&self) -> f64 { self.target_density }

    /// Removes uniformly random edges from `graph` until its density is at
    /// most the target, then checks connectivity.
    ///
    /// The loop performs at most one iteration per initial edge.
    ///
    /// # Errors
    /// Returns [`HararyError::DensityUnreachable`] before touching the graph
    /// when the target leaves fewer than `n - 1` edges, and
    /// [`HararyError::DisconnectedAfterSparsification`] when the result is
    /// not connected.
    #[instrument(
        name = "core.sparsify",
        err,
        skip(self, graph, rng),
        fields(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            target_density = self.target_density,
        ),
    )]
    pub fn sparsify<R: Rng>(
        &self,
        graph: &mut SignedGraph,
        rng: &mut R,
    ) -> Result<SparsificationReport> {
        ensure_connectable(graph.node_count(), self.target_density)?;

        let mut removed = 0;
        for _ in 0..graph.edge_count() {
            if graph.density() <= self.target_density {
                break;
            }
            let slot = rng.gen_range(0..graph.edge_count());
            let Some(edge) = graph.edge_at(slot) else {
                break;
            };
            graph.remove_edge(edge.low(), edge.high())?;
            removed += 1;
        }

        let density = graph.density();
        let components = graph.component_count();
        if components > 1 {
            warn!(
                components,
                density, removed, "sparsification disconnected the graph"
            );
            return Err(HararyError::DisconnectedAfterSparsification {
                components,
                density,
            });
        }

        debug!(removed, density, "sparsification complete");
        Ok(SparsificationReport { removed, density })
    }
}
