//! Batch orchestration.
//!
//! Each instance runs build, sparsify, index and perturb on its own graph
//! with its own random source. A failed instance is recorded in the
//! [`BatchReport`] and never aborts the rest of the batch.

use tracing::{info, instrument, warn};

use crate::{
    BalancePerturbator, CommunityBalancer, DensitySparsifier, GenerationMode, GenerationTarget,
    Result, TriangleIndex,
    builder::ExecutionStrategy,
    result::{BatchReport, InstanceFailure, InstanceReport, Snapshot},
    rng::instance_rng,
};

type InstanceOutcome = core::result::Result<InstanceReport, InstanceFailure>;

/// Entry point for running a generation batch.
///
/// Built by [`crate::GeneratorBuilder::build`].
///
/// # Examples
/// ```
/// use harary_core::{ExecutionStrategy, GeneratorBuilder, SnapshotLabel};
///
/// let generator = GeneratorBuilder::new()
///     .with_node_count(10)
///     .with_target_density(0.7)
///     .with_target_schedule([0.2, 0.6])
///     .with_instances(3)
///     .with_retries(4)
///     .with_seed(11)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()?;
/// let report = generator.run()?;
/// for instance in report.instances() {
///     let labels: Vec<_> = instance.snapshots().iter().map(|s| s.label()).collect();
///     assert_eq!(
///         labels,
///         [SnapshotLabel::Baseline, SnapshotLabel::Target(0.2), SnapshotLabel::Target(0.6)]
///     );
/// }
/// # Ok::<(), harary_core::HararyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Generator {
    pub(crate) target: GenerationTarget,
    pub(crate) mode: GenerationMode,
    pub(crate) instances: usize,
    pub(crate) seed: u64,
    pub(crate) execution_strategy: ExecutionStrategy,
    pub(crate) retries: usize,
    pub(crate) balancer: CommunityBalancer,
    pub(crate) sparsifier: DensitySparsifier,
    pub(crate) perturbator: BalancePerturbator,
}

impl Generator {
    /// Parameters shared by every instance.
    #[must_use]
    #[rustfmt::skip]
    pub const fn target(&self) -> &GenerationTarget { &self.target }

    /// Single snapshot or sequence.
    #[must_use]
    #[rustfmt::skip]
    pub const fn mode(&self) -> GenerationMode { self.mode }

    /// Number of independent instances.
    #[must_use]
    #[rustfmt::skip]
    pub const fn instances(&self) -> usize { self.instances }

    /// Batch seed.
    #[must_use]
    #[rustfmt::skip]
    pub const fn seed(&self) -> u64 { self.seed }

    /// Extra attempts granted to a failed instance.
    #[must_use]
    #[rustfmt::skip]
    pub const fn retries(&self) -> usize { self.retries }

    /// Returns the execution strategy that will be used when running.
    #[must_use]
    #[rustfmt::skip]
    pub const fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Runs every instance and collects snapshots and failures.
    ///
    /// # Errors
    /// Returns [`crate::HararyError::BackendUnavailable`] when
    /// [`ExecutionStrategy::Parallel`] is requested without the `parallel`
    /// feature. Per-instance failures are reported in the [`BatchReport`].
    #[instrument(
        name = "core.run",
        err,
        skip(self),
        fields(
            nodes = self.target.node_count(),
            density = self.target.target_density(),
            instances = self.instances,
            mode = ?self.mode,
            strategy = ?self.execution_strategy,
        ),
    )]
    pub fn run(&self) -> Result<BatchReport> {
        let outcomes = match self.execution_strategy {
            ExecutionStrategy::Sequential => self.run_sequential(),
            #[cfg(feature = "parallel")]
            ExecutionStrategy::Auto | ExecutionStrategy::Parallel => self.run_parallel(),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Auto => self.run_sequential(),
            #[cfg(not(feature = "parallel"))]
            ExecutionStrategy::Parallel => {
                return Err(crate::HararyError::BackendUnavailable {
                    requested: ExecutionStrategy::Parallel,
                });
            }
        };

        let report = BatchReport::from_outcomes(self.target.clone(), self.mode, outcomes);
        info!(
            succeeded = report.instances().len(),
            failed = report.failures().len(),
            unreachable = report.unreachable_snapshots(),
            "batch complete"
        );
        Ok(report)
    }

    fn run_sequential(&self) -> Vec<InstanceOutcome> {
        (0..self.instances)
            .map(|instance| self.run_instance(instance))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn run_parallel(&self) -> Vec<InstanceOutcome> {
        use rayon::prelude::*;

        (0..self.instances)
            .into_par_iter()
            .map(|instance| self.run_instance(instance))
            .collect()
    }

    /// Runs one instance, retrying retryable failures from a fresh balanced
    /// graph.
    ///
    /// # Errors
    /// Returns an [`InstanceFailure`] carrying the last error once the
    /// failure is not retryable or the retries are used up.
    #[instrument(name = "core.instance", skip(self))]
    pub fn run_instance(&self, instance: usize) -> InstanceOutcome {
        let mut attempt = 0;
        loop {
            match self.attempt_instance(instance, attempt) {
                Ok((density, snapshots)) => {
                    return Ok(InstanceReport::new(instance, attempt + 1, density, snapshots));
                }
                Err(error) if error.is_retryable() && attempt < self.retries => {
                    warn!(attempt, code = %error.code(), %error, "retrying instance");
                    attempt += 1;
                }
                Err(error) => {
                    warn!(code = %error.code(), %error, "instance failed");
                    return Err(InstanceFailure::new(instance, attempt + 1, error));
                }
            }
        }
    }

    fn attempt_instance(&self, instance: usize, attempt: usize) -> Result<(f64, Vec<Snapshot>)> {
        let mut rng = instance_rng(self.seed, instance, attempt);
        let mut graph = self.balancer.build(self.target.node_count(), &mut rng);
        let sparsified = self.sparsifier.sparsify(&mut graph, &mut rng)?;
        let mut index = TriangleIndex::rebuild(&graph);
        let baseline = index.unbalanced_ratio()?;

        let mut snapshots = Vec::with_capacity(self.target.target_ratios().len() + 1);
        if self.mode == GenerationMode::Sequence {
            snapshots.push(Snapshot::baseline(&graph, baseline));
        }
        for &target in self.target.target_ratios() {
            let outcome = self
                .perturbator
                .perturb(&mut graph, &mut index, target, &mut rng)?;
            snapshots.push(Snapshot::after(target, &outcome, &graph));
        }
        Ok((sparsified.density(), snapshots))
    }
}
