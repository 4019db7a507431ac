//! Builder utilities for configuring generation batches.
//!
//! Exposes the execution strategy selection surface and the validation run
//! before a [`Generator`] is constructed.

use crate::{
    BalancePerturbator, CommunityBalancer, DensitySparsifier, FlipPolicy, PartitionMethod, Result,
    error::HararyError,
    generator::Generator,
    perturbator::validate_target,
    sparsifier::{ensure_connectable, validate_density},
};

/// Node count used when none is configured.
pub const DEFAULT_NODE_COUNT: usize = 30;
/// Target density used when none is configured.
pub const DEFAULT_DENSITY: f64 = 0.3;
/// Single target ratio used when none is configured.
pub const DEFAULT_TARGET_RATIO: f64 = 0.5;
/// Number of instances generated when none is configured.
pub const DEFAULT_INSTANCES: usize = 10;

/// Indicates how a [`Generator`] schedules independent instances when
/// [`Generator::run`] is invoked.
///
/// Each instance owns a random source derived from the batch seed, so every
/// strategy produces the same batch for the same configuration.
///
/// # Examples
/// ```
/// use harary_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::Auto;
/// assert!(matches!(strategy, ExecutionStrategy::Auto));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExecutionStrategy {
    /// Run in parallel when the `parallel` feature is enabled, sequentially
    /// otherwise.
    #[default]
    Auto,
    /// Run instances one after another on the calling thread.
    Sequential,
    /// Fan instances out over the rayon thread pool.
    Parallel,
}

/// How many snapshots each instance emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GenerationMode {
    /// One snapshot at the single target ratio.
    #[default]
    Single,
    /// A baseline snapshot followed by one snapshot per target of an
    /// ascending schedule, all perturbed from the same base graph.
    Sequence,
}

/// Validated parameters shared by every instance of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationTarget {
    node_count: usize,
    target_density: f64,
    target_ratios: Vec<f64>,
}

impl GenerationTarget {
    pub(crate) const fn new(node_count: usize, target_density: f64, target_ratios: Vec<f64>) -> Self {
        Self {
            node_count,
            target_density,
            target_ratios,
        }
    }

    /// Number of nodes per graph.
    #[must_use]
    #[rustfmt::skip]
    pub const fn node_count(&self) -> usize { self.node_count }

    /// Density reached by sparsification.
    #[must_use]
    #[rustfmt::skip]
    pub const fn target_density(&self) -> f64 { self.target_density }

    /// Target unbalanced ratios, in the order they are pursued.
    #[must_use]
    pub fn target_ratios(&self) -> &[f64] {
        &self.target_ratios
    }
}

/// Configures and constructs [`Generator`] instances.
///
/// # Examples
/// ```
/// use harary_core::{ExecutionStrategy, GeneratorBuilder};
///
/// let generator = GeneratorBuilder::new()
///     .with_node_count(12)
///     .with_target_density(0.6)
///     .with_target_ratio(0.3)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(generator.target().node_count(), 12);
/// assert_eq!(generator.execution_strategy(), ExecutionStrategy::Sequential);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorBuilder {
    node_count: usize,
    target_density: f64,
    target_ratios: Vec<f64>,
    mode: GenerationMode,
    instances: usize,
    partition: PartitionMethod,
    seed: u64,
    execution_strategy: ExecutionStrategy,
    retries: usize,
    policy: FlipPolicy,
    attempt_budget: Option<usize>,
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self {
            node_count: DEFAULT_NODE_COUNT,
            target_density: DEFAULT_DENSITY,
            target_ratios: vec![DEFAULT_TARGET_RATIO],
            mode: GenerationMode::Single,
            instances: DEFAULT_INSTANCES,
            partition: PartitionMethod::default(),
            seed: 0,
            execution_strategy: ExecutionStrategy::Auto,
            retries: 0,
            policy: FlipPolicy::default(),
            attempt_budget: None,
        }
    }
}

impl GeneratorBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use harary_core::{GenerationMode, GeneratorBuilder};
    ///
    /// let builder = GeneratorBuilder::new();
    /// assert_eq!(builder.node_count(), 30);
    /// assert_eq!(builder.mode(), GenerationMode::Single);
    /// assert_eq!(builder.target_ratios(), &[0.5]);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the number of nodes per graph.
    #[must_use]
    pub const fn with_node_count(mut self, node_count: usize) -> Self {
        self.node_count = node_count;
        self
    }

    /// Returns the configured node count.
    #[must_use]
    #[rustfmt::skip]
    pub const fn node_count(&self) -> usize { self.node_count }

    /// Overrides the density sparsification stops at.
    #[must_use]
    pub const fn with_target_density(mut self, density: f64) -> Self {
        self.target_density = density;
        self
    }

    /// Requests a single snapshot at `ratio`.
    #[must_use]
    pub fn with_target_ratio(mut self, ratio: f64) -> Self {
        self.target_ratios = vec![ratio];
        self.mode = GenerationMode::Single;
        self
    }

    /// Requests a baseline snapshot followed by one snapshot per entry of
    /// `ratios`, pursued in order from the same base graph.
    ///
    /// # Examples
    /// ```
    /// use harary_core::{GenerationMode, GeneratorBuilder};
    ///
    /// let builder = GeneratorBuilder::new().with_target_schedule([0.2, 0.4, 0.6]);
    /// assert_eq!(builder.mode(), GenerationMode::Sequence);
    /// assert_eq!(builder.target_ratios(), &[0.2, 0.4, 0.6]);
    /// ```
    #[must_use]
    pub fn with_target_schedule(mut self, ratios: impl IntoIterator<Item = f64>) -> Self {
        self.target_ratios = ratios.into_iter().collect();
        self.mode = GenerationMode::Sequence;
        self
    }

    /// Returns the configured target ratios.
    #[must_use]
    pub fn target_ratios(&self) -> &[f64] {
        &self.target_ratios
    }

    /// Returns the configured generation mode.
    #[must_use]
    #[rustfmt::skip]
    pub const fn mode(&self) -> GenerationMode { self.mode }

    /// Overrides the number of independent instances.
    #[must_use]
    pub const fn with_instances(mut self, instances: usize) -> Self {
        self.instances = instances;
        self
    }

    /// Overrides the community partition method.
    #[must_use]
    pub const fn with_partition(mut self, partition: PartitionMethod) -> Self {
        self.partition = partition;
        self
    }

    /// Returns the community partition method.
    #[must_use]
    #[rustfmt::skip]
    pub const fn partition(&self) -> PartitionMethod { self.partition }

    /// Sets the batch seed every instance seed is derived from.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the execution strategy to use when running the batch.
    ///
    /// # Examples
    /// ```
    /// use harary_core::{ExecutionStrategy, GeneratorBuilder};
    ///
    /// let builder = GeneratorBuilder::new().with_execution_strategy(ExecutionStrategy::Sequential);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Sequential);
    /// ```
    #[must_use]
    pub const fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    #[rustfmt::skip]
    pub const fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Allows a disconnected or triangle-free instance to be regenerated
    /// from a fresh balanced graph up to `retries` more times.
    #[must_use]
    pub const fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the flip policy used during perturbation.
    #[must_use]
    pub const fn with_flip_policy(mut self, policy: FlipPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Caps the number of flip proposals drawn per target.
    #[must_use]
    pub const fn with_attempt_budget(mut self, budget: usize) -> Self {
        self.attempt_budget = Some(budget);
        self
    }

    /// Validates the configuration and constructs a [`Generator`].
    ///
    /// # Errors
    /// Returns [`HararyError::InvalidNodeCount`] below two nodes,
    /// [`HararyError::InvalidDensity`] outside `(0, 1)`,
    /// [`HararyError::DensityUnreachable`] when the density cannot keep a
    /// spanning tree, [`HararyError::EmptyTargetSchedule`],
    /// [`HararyError::InvalidTargetRatio`] and
    /// [`HararyError::DescendingTargetSchedule`] for bad targets,
    /// [`HararyError::InvalidInstanceCount`] for zero instances and
    /// [`HararyError::InvalidPartitionSize`] for an empty partition.
    ///
    /// # Examples
    /// ```
    /// use harary_core::{GeneratorBuilder, HararyError};
    ///
    /// let err = GeneratorBuilder::new().with_node_count(1).build().unwrap_err();
    /// assert_eq!(err, HararyError::InvalidNodeCount { got: 1 });
    /// ```
    pub fn build(self) -> Result<Generator> {
        if self.node_count < 2 {
            return Err(HararyError::InvalidNodeCount {
                got: self.node_count,
            });
        }
        let density = validate_density(self.target_density)?;
        ensure_connectable(self.node_count, density)?;
        validate_schedule(&self.target_ratios)?;
        if self.instances == 0 {
            return Err(HararyError::InvalidInstanceCount { got: 0 });
        }
        if self.partition.size() == 0 {
            return Err(HararyError::InvalidPartitionSize { got: 0 });
        }

        let mut perturbator = BalancePerturbator::new().with_policy(self.policy);
        if let Some(budget) = self.attempt_budget {
            perturbator = perturbator.with_attempt_budget(budget);
        }
        Ok(Generator {
            target: GenerationTarget::new(self.node_count, density, self.target_ratios),
            mode: self.mode,
            instances: self.instances,
            seed: self.seed,
            execution_strategy: self.execution_strategy,
            retries: self.retries,
            balancer: CommunityBalancer::new(self.partition),
            sparsifier: DensitySparsifier::new(density)?,
            perturbator,
        })
    }
}

fn validate_schedule(ratios: &[f64]) -> Result<()> {
    if ratios.is_empty() {
        return Err(HararyError::EmptyTargetSchedule);
    }
    for &ratio in ratios {
        validate_target(ratio)?;
    }
    if let Some(pair) = ratios.windows(2).find(|pair| pair[1] < pair[0]) {
        return Err(HararyError::DescendingTargetSchedule {
            previous: pair[0],
            next: pair[1],
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::tiny(GeneratorBuilder::new().with_node_count(0), HararyError::InvalidNodeCount { got: 0 })]
    #[case::zero_density(
        GeneratorBuilder::new().with_target_density(0.0),
        HararyError::InvalidDensity { got: 0.0 }
    )]
    #[case::full_density(
        GeneratorBuilder::new().with_target_density(1.0),
        HararyError::InvalidDensity { got: 1.0 }
    )]
    #[case::ratio_too_large(
        GeneratorBuilder::new().with_target_ratio(1.2),
        HararyError::InvalidTargetRatio { got: 1.2 }
    )]
    #[case::empty_schedule(
        GeneratorBuilder::new().with_target_schedule([]),
        HararyError::EmptyTargetSchedule
    )]
    #[case::descending(
        GeneratorBuilder::new().with_target_schedule([0.2, 0.6, 0.4]),
        HararyError::DescendingTargetSchedule { previous: 0.6, next: 0.4 }
    )]
    #[case::no_instances(
        GeneratorBuilder::new().with_instances(0),
        HararyError::InvalidInstanceCount { got: 0 }
    )]
    #[case::empty_partition(
        GeneratorBuilder::new().with_partition(PartitionMethod::RandomDraws { draws: 0 }),
        HararyError::InvalidPartitionSize { got: 0 }
    )]
    fn build_rejects_invalid_configuration(
        #[case] builder: GeneratorBuilder,
        #[case] expected: HararyError,
    ) {
        assert_eq!(builder.build().expect_err("configuration is invalid"), expected);
    }

    #[test]
    fn build_rejects_density_below_spanning_tree() {
        let err = GeneratorBuilder::new()
            .with_node_count(30)
            .with_target_density(0.05)
            .build()
            .expect_err("0.05 cannot keep 30 nodes connected");
        assert!(matches!(
            err,
            HararyError::DensityUnreachable { node_count: 30, .. }
        ));
    }

    #[test]
    fn equal_consecutive_targets_are_accepted() {
        let generator = GeneratorBuilder::new()
            .with_target_schedule([0.2, 0.2, 1.0])
            .build()
            .expect("non-decreasing schedule is valid");
        assert_eq!(generator.target().target_ratios(), &[0.2, 0.2, 1.0]);
        assert_eq!(generator.mode(), GenerationMode::Sequence);
    }

    #[test]
    fn single_target_replaces_schedule() {
        let builder = GeneratorBuilder::new()
            .with_target_schedule([0.1, 0.2])
            .with_target_ratio(0.7);
        assert_eq!(builder.mode(), GenerationMode::Single);
        assert_eq!(builder.target_ratios(), &[0.7]);
    }

    #[test]
    #[expect(clippy::float_arithmetic, reason = "tolerance comparison")]
    fn defaults_describe_the_reference_batch() {
        let generator = GeneratorBuilder::new().build().expect("defaults are valid");
        let target = generator.target();
        assert_eq!(target.node_count(), DEFAULT_NODE_COUNT);
        assert!((target.target_density() - DEFAULT_DENSITY).abs() < f64::EPSILON);
        assert_eq!(generator.instances(), DEFAULT_INSTANCES);
        assert_eq!(generator.retries(), 0);
        assert_eq!(generator.execution_strategy(), ExecutionStrategy::Auto);
    }
}
