//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of using
//! `.expect()`.

use harary_core::HararyError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Configuring or running the generator failed.
    #[error("generation failed: {0}")]
    Generation(#[from] HararyError),
    /// The fixture graph has no balanced triangle left to perturb.
    #[error("fixture graph with {node_count} nodes has no balanced triangle")]
    NoBalancedTriangle {
        /// Nodes in the fixture graph.
        node_count: usize,
    },
}
