//! Shared helpers for the integration tests.

use harary_core::{ExecutionStrategy, GeneratorBuilder, PartitionMethod};

/// Builder for a small batch that always has triangles after sparsification.
///
/// Twelve nodes at density 0.6 keep 39 edges, more than the 36 a
/// triangle-free graph on twelve nodes can hold.
#[must_use]
pub fn small_batch() -> GeneratorBuilder {
    GeneratorBuilder::new()
        .with_node_count(12)
        .with_target_density(0.6)
        .with_instances(4)
        .with_partition(PartitionMethod::Prefix { size: 5 })
        .with_retries(5)
        .with_seed(42)
        .with_execution_strategy(ExecutionStrategy::Sequential)
}
