//! Deterministic sparsified graphs for benchmarks.

use harary_core::{
    CommunityBalancer, DensitySparsifier, EdgeKey, PartitionMethod, SignedGraph, TriangleIndex,
    instance_rng,
};

use crate::{error::BenchSetupError, params::GraphBenchParams};

/// A balanced, sparsified graph with its triangle index.
#[derive(Clone, Debug)]
pub struct GraphFixture {
    /// The sparsified graph.
    pub graph: SignedGraph,
    /// Triangle index built from `graph`.
    pub index: TriangleIndex,
}

impl GraphFixture {
    /// Builds a fixture by partitioning the nodes in half, sparsifying the
    /// complete graph and retrying on fresh seeds until it stays connected.
    ///
    /// # Errors
    /// Returns [`BenchSetupError::Generation`] when the density is invalid
    /// or every attempt disconnects the graph.
    pub fn generate(params: GraphBenchParams, seed: u64) -> Result<Self, BenchSetupError> {
        const ATTEMPTS: usize = 8;

        let balancer = CommunityBalancer::new(PartitionMethod::Prefix {
            size: params.node_count.div_ceil(2),
        });
        let sparsifier = DensitySparsifier::new(params.density)?;
        let mut attempt = 0;
        loop {
            let mut rng = instance_rng(seed, 0, attempt);
            let mut graph = balancer.build(params.node_count, &mut rng);
            match sparsifier.sparsify(&mut graph, &mut rng) {
                Ok(_) => {
                    let index = TriangleIndex::rebuild(&graph);
                    return Ok(Self { graph, index });
                }
                Err(err) if err.is_retryable() && attempt + 1 < ATTEMPTS => attempt += 1,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Returns an edge of the first balanced triangle.
    ///
    /// # Errors
    /// Returns [`BenchSetupError::NoBalancedTriangle`] when every triangle
    /// is unbalanced.
    pub fn balanced_edge(&self) -> Result<EdgeKey, BenchSetupError> {
        self.index
            .balanced_triangles()
            .next()
            .map(|triangle| {
                let [edge, _, _] = triangle.edges();
                edge
            })
            .ok_or(BenchSetupError::NoBalancedTriangle {
                node_count: self.graph.node_count(),
            })
    }
}
