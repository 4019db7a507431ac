//! Benchmark parameter types.

use std::fmt;

/// Shape of a sparsified benchmark graph.
#[derive(Clone, Copy, Debug)]
pub struct GraphBenchParams {
    /// Number of nodes.
    pub node_count: usize,
    /// Density the complete graph is sparsified to.
    pub density: f64,
}

impl fmt::Display for GraphBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},d={}", self.node_count, self.density)
    }
}

/// Parameters for a batch generation benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct BatchBenchParams {
    /// Shape of every generated graph.
    pub graph: GraphBenchParams,
    /// Number of instances per batch.
    pub instances: usize,
    /// Target unbalanced ratio.
    pub ratio: f64,
}

impl fmt::Display for BatchBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},i={},r={}", self.graph, self.instances, self.ratio)
    }
}
