//! Result types for generation batches.
//!
//! A [`BatchReport`] holds, per instance, either the emitted snapshots or
//! the failure that stopped the instance. Failures never abort a batch.

use std::fmt;

use thiserror::Error;

use crate::{
    GenerationMode, GenerationTarget, HararyError, SignedEdge, SignedGraph, TargetStatus,
    perturbator::PerturbationOutcome,
};

/// Identifies a snapshot within an instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapshotLabel {
    /// The balanced, sparsified graph before any flip.
    Baseline,
    /// The graph after perturbing towards the given target ratio.
    Target(f64),
}

impl SnapshotLabel {
    /// Ratio the snapshot was generated for; `0` for the baseline.
    #[must_use]
    pub const fn ratio(self) -> f64 {
        match self {
            Self::Baseline => 0.0,
            Self::Target(ratio) => ratio,
        }
    }
}

impl fmt::Display for SnapshotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Baseline => f.write_str("0"),
            Self::Target(ratio) => write!(f, "{ratio}"),
        }
    }
}

/// Signed edge list of one generated graph together with its balance state.
///
/// # Examples
/// ```
/// use harary_core::{ExecutionStrategy, GeneratorBuilder, SnapshotLabel};
///
/// let report = GeneratorBuilder::new()
///     .with_node_count(8)
///     .with_target_density(0.8)
///     .with_target_ratio(0.25)
///     .with_instances(1)
///     .with_retries(8)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()?
///     .run()?;
/// let instance = &report.instances()[0];
/// let snapshot = &instance.snapshots()[0];
/// assert_eq!(snapshot.label(), SnapshotLabel::Target(0.25));
/// assert!(snapshot.edges().iter().all(|edge| edge.source() < edge.target()));
/// # Ok::<(), harary_core::HararyError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    label: SnapshotLabel,
    status: TargetStatus,
    ratio: f64,
    flips: usize,
    edges: Vec<SignedEdge>,
}

impl Snapshot {
    pub(crate) fn baseline(graph: &SignedGraph, ratio: f64) -> Self {
        Self {
            label: SnapshotLabel::Baseline,
            status: TargetStatus::Reached,
            ratio,
            flips: 0,
            edges: graph.edges().collect(),
        }
    }

    pub(crate) fn after(target: f64, outcome: &PerturbationOutcome, graph: &SignedGraph) -> Self {
        Self {
            label: SnapshotLabel::Target(target),
            status: outcome.status(),
            ratio: outcome.ratio(),
            flips: outcome.flips(),
            edges: graph.edges().collect(),
        }
    }

    /// Which target the snapshot belongs to.
    #[must_use]
    #[rustfmt::skip]
    pub const fn label(&self) -> SnapshotLabel { self.label }

    /// Whether the target was reached.
    #[must_use]
    #[rustfmt::skip]
    pub const fn status(&self) -> TargetStatus { self.status }

    /// Unbalanced-triangle ratio of the snapshot.
    #[must_use]
    #[rustfmt::skip]
    pub const fn ratio(&self) -> f64 { self.ratio }

    /// Flips applied while pursuing this snapshot's target.
    #[must_use]
    #[rustfmt::skip]
    pub const fn flips(&self) -> usize { self.flips }

    /// Edges in ascending `(source, target)` order with `source < target`.
    #[must_use]
    pub fn edges(&self) -> &[SignedEdge] {
        &self.edges
    }
}

/// Snapshots emitted by one successful instance.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceReport {
    instance: usize,
    attempts: usize,
    density: f64,
    snapshots: Vec<Snapshot>,
}

impl InstanceReport {
    pub(crate) const fn new(
        instance: usize,
        attempts: usize,
        density: f64,
        snapshots: Vec<Snapshot>,
    ) -> Self {
        Self {
            instance,
            attempts,
            density,
            snapshots,
        }
    }

    /// Zero-based instance number.
    #[must_use]
    #[rustfmt::skip]
    pub const fn instance(&self) -> usize { self.instance }

    /// Attempts used, including the successful one.
    #[must_use]
    #[rustfmt::skip]
    pub const fn attempts(&self) -> usize { self.attempts }

    /// Density after sparsification.
    #[must_use]
    #[rustfmt::skip]
    pub const fn density(&self) -> f64 { self.density }

    /// Snapshots in emission order.
    #[must_use]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }
}

/// An instance that produced no snapshots.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("instance {instance} failed after {attempts} attempt(s): {error}")]
pub struct InstanceFailure {
    instance: usize,
    attempts: usize,
    #[source]
    error: HararyError,
}

impl InstanceFailure {
    pub(crate) const fn new(instance: usize, attempts: usize, error: HararyError) -> Self {
        Self {
            instance,
            attempts,
            error,
        }
    }

    /// Zero-based instance number.
    #[must_use]
    #[rustfmt::skip]
    pub const fn instance(&self) -> usize { self.instance }

    /// Attempts made before giving up.
    #[must_use]
    #[rustfmt::skip]
    pub const fn attempts(&self) -> usize { self.attempts }

    /// Error from the last attempt.
    #[must_use]
    #[rustfmt::skip]
    pub const fn error(&self) -> &HararyError { &self.error }
}

/// Outcome of [`crate::Generator::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    target: GenerationTarget,
    mode: GenerationMode,
    instances: Vec<InstanceReport>,
    failures: Vec<InstanceFailure>,
}

impl BatchReport {
    pub(crate) fn from_outcomes(
        target: GenerationTarget,
        mode: GenerationMode,
        outcomes: Vec<Result<InstanceReport, InstanceFailure>>,
    ) -> Self {
        let mut instances = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(report) => instances.push(report),
                Err(failure) => failures.push(failure),
            }
        }
        Self {
            target,
            mode,
            instances,
            failures,
        }
    }

    /// Parameters the batch was generated with.
    #[must_use]
    #[rustfmt::skip]
    pub const fn target(&self) -> &GenerationTarget { &self.target }

    /// Whether instances hold one snapshot or a sequence.
    #[must_use]
    #[rustfmt::skip]
    pub const fn mode(&self) -> GenerationMode { self.mode }

    /// Successful instances in ascending instance order.
    #[must_use]
    pub fn instances(&self) -> &[InstanceReport] {
        &self.instances
    }

    /// Failed instances in ascending instance order.
    #[must_use]
    pub fn failures(&self) -> &[InstanceFailure] {
        &self.failures
    }

    /// Number of snapshots with [`TargetStatus::Unreachable`].
    #[must_use]
    pub fn unreachable_snapshots(&self) -> usize {
        self.instances
            .iter()
            .flat_map(InstanceReport::snapshots)
            .filter(|snapshot| !snapshot.status().is_reached())
            .count()
    }
}
