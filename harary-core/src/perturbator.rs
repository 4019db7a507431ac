//! Sign flips that push a graph towards a target unbalanced-triangle ratio.
//!
//! Each step draws a balanced triangle uniformly at random, picks two of its
//! three nodes, and flips the edge between them. The triangle index is
//! refreshed for the flipped edge only.

use rand::{Rng, seq::index::sample};
use tracing::{debug, instrument, warn};

use crate::{
    EdgeKey, Sign, SignedGraph, TriangleIndex,
    error::{HararyError, Result},
};

/// Minimum number of proposals granted to a single target.
pub const MIN_ATTEMPT_BUDGET: usize = 1024;

/// Proposals granted per indexed triangle.
pub const ATTEMPTS_PER_TRIANGLE: usize = 64;

/// Decides whether a proposed flip is applied.
///
/// The two policies draw proposals identically and differ only in the
/// acceptance test, so they produce different graph distributions for the
/// same seed. [`FlipPolicy::Unconditional`] is the plain random walk in
/// which every sampled proposal is flipped. [`FlipPolicy::NonDecreasing`] filters
/// that walk and is the default. Select `Unconditional` to reproduce graphs
/// generated by the unfiltered walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlipPolicy {
    /// Apply the flip only when it does not lower the number of unbalanced
    /// triangles, so the ratio never decreases between steps.
    ///
    /// A flip can balance more triangles than it unbalances. Those
    /// proposals are rejected here but applied by the unfiltered walk.
    #[default]
    NonDecreasing,
    /// Apply every proposal, whatever its effect on the ratio.
    ///
    /// This is the unfiltered walk. The ratio may fall between steps and
    /// the perturbation still stops once it reaches the target.
    Unconditional,
}

/// Why a target ratio could not be reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnreachableReason {
    /// No balanced triangle remained to draw a flip from.
    NoBalancedTriangles,
    /// The attempt budget ran out first.
    AttemptBudgetExhausted,
}

/// Final state of one perturbation towards a target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TargetStatus {
    /// The unbalanced ratio reached the target.
    Reached,
    /// Perturbation stopped short of the target.
    Unreachable {
        /// Ratio achieved when perturbation stopped.
        achieved: f64,
        /// Why perturbation stopped.
        reason: UnreachableReason,
    },
}

impl TargetStatus {
    /// Returns `true` for [`TargetStatus::Reached`].
    #[must_use]
    pub const fn is_reached(&self) -> bool {
        matches!(self, Self::Reached)
    }
}

/// Result of a single perturbation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The edge was flipped.
    Flipped(EdgeKey),
    /// The flip policy refused to flip the proposed edge.
    Rejected(EdgeKey),
    /// There was no balanced triangle to draw from.
    Exhausted,
}

/// Summary of [`BalancePerturbator::perturb`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerturbationOutcome {
    status: TargetStatus,
    ratio: f64,
    flips: usize,
    attempts: usize,
}

impl PerturbationOutcome {
    /// Whether the target was reached.
    #[must_use]
    #[rustfmt::skip]
    pub const fn status(&self) -> TargetStatus { self.status }

    /// Unbalanced ratio after perturbation.
    #[must_use]
    #[rustfmt::skip]
    pub const fn ratio(&self) -> f64 { self.ratio }

    /// Number of edges flipped.
    #[must_use]
    #[rustfmt::skip]
    pub const fn flips(&self) -> usize { self.flips }

    /// Number of proposals drawn, applied or not.
    #[must_use]
    #[rustfmt::skip]
    pub const fn attempts(&self) -> usize { self.attempts }
}

/// Drives the unbalanced-triangle ratio of a graph towards a target.
///
/// # Examples
/// ```
/// use harary_core::{BalancePerturbator, Sign, SignedGraph, TriangleIndex};
/// use rand::{SeedableRng, rngs::SmallRng};
///
/// let mut graph = SignedGraph::complete(6, |_, _| Sign::Positive);
/// let mut index = TriangleIndex::rebuild(&graph);
/// let outcome = BalancePerturbator::default().perturb(
///     &mut graph,
///     &mut index,
///     0.4,
///     &mut SmallRng::seed_from_u64(17),
/// )?;
/// assert!(outcome.status().is_reached());
/// assert!(outcome.ratio() >= 0.4);
/// # Ok::<(), harary_core::HararyError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BalancePerturbator {
    policy: FlipPolicy,
    attempt_budget: Option<usize>,
}

impl BalancePerturbator {
    /// Creates a perturbator with the default policy and budget.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            policy: FlipPolicy::NonDecreasing,
            attempt_budget: None,
        }
    }

    /// Sets the flip policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: FlipPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Caps the number of proposals drawn for each target.
    #[must_use]
    pub const fn with_attempt_budget(mut self, budget: usize) -> Self {
        self.attempt_budget = Some(budget);
        self
    }

    /// Returns the flip policy.
    #[must_use]
    #[rustfmt::skip]
    pub const fn policy(&self) -> FlipPolicy { self.policy }

    /// Returns the proposal budget for an index of `triangles` triangles.
    #[must_use]
    pub fn attempt_budget(&self, triangles: usize) -> usize {
        self.attempt_budget.unwrap_or_else(|| {
            triangles
                .saturating_mul(ATTEMPTS_PER_TRIANGLE)
                .max(MIN_ATTEMPT_BUDGET)
        })
    }

    /// Flips edges until the unbalanced ratio is at least `target`.
    ///
    /// `index` must describe `graph`; it is kept in sync with every flip.
    ///
    /// # Errors
    /// Returns [`HararyError::InvalidTargetRatio`] when `target` lies outside
    /// `[0, 1]` and [`HararyError::UndefinedRatio`] when the graph has no
    /// triangles.
    #[instrument(
        name = "core.perturb",
        err,
        skip(self, graph, index, target, rng),
        fields(target_ratio = target, triangles = index.len(), policy = ?self.policy),
    )]
    pub fn perturb<R: Rng>(
        &self,
        graph: &mut SignedGraph,
        index: &mut TriangleIndex,
        target: f64,
        rng: &mut R,
    ) -> Result<PerturbationOutcome> {
        let target = validate_target(target)?;
        let budget = self.attempt_budget(index.len());
        let mut ratio = index.unbalanced_ratio()?;
        let mut flips = 0;
        let mut attempts = 0;

        let status = loop {
            if ratio >= target {
                break TargetStatus::Reached;
            }
            if attempts == budget {
                break TargetStatus::Unreachable {
                    achieved: ratio,
                    reason: UnreachableReason::AttemptBudgetExhausted,
                };
            }
            attempts += 1;
            match self.step(graph, index, rng)? {
                StepOutcome::Flipped(_) => {
                    flips += 1;
                    ratio = index.unbalanced_ratio()?;
                }
                StepOutcome::Rejected(_) => {}
                StepOutcome::Exhausted => {
                    break TargetStatus::Unreachable {
                        achieved: ratio,
                        reason: UnreachableReason::NoBalancedTriangles,
                    };
                }
            }
        };

        match status {
            TargetStatus::Reached => debug!(ratio, flips, attempts, "target reached"),
            TargetStatus::Unreachable { reason, .. } => {
                warn!(
                    target_ratio = target,
                    ratio,
                    flips,
                    attempts,
                    ?reason,
                    "target unreachable"
                );
            }
        }
        Ok(PerturbationOutcome {
            status,
            ratio,
            flips,
            attempts,
        })
    }

    /// Draws one flip proposal and applies it if the policy allows.
    ///
    /// # Errors
    /// Returns [`HararyError::Graph`] when `index` refers to edges missing
    /// from `graph`.
    pub fn step<R: Rng>(
        &self,
        graph: &mut SignedGraph,
        index: &mut TriangleIndex,
        rng: &mut R,
    ) -> Result<StepOutcome> {
        if index.balanced_count() == 0 {
            return Ok(StepOutcome::Exhausted);
        }
        let position = rng.gen_range(0..index.balanced_count());
        let Some(triangle) = index.balanced_at(position) else {
            return Ok(StepOutcome::Exhausted);
        };
        let nodes = triangle.nodes();
        let pair = sample(rng, nodes.len(), 2);
        let edge = EdgeKey::new(nodes[pair.index(0)], nodes[pair.index(1)])?;

        if self.policy == FlipPolicy::NonDecreasing && index.edge_balance(edge).flip_gain() < 0 {
            return Ok(StepOutcome::Rejected(edge));
        }
        Self::flip(graph, index, edge)?;
        Ok(StepOutcome::Flipped(edge))
    }

    /// Flips `edge` in `graph` and refreshes the triangles that contain it.
    /// Returns the new sign.
    ///
    /// # Errors
    /// Returns [`HararyError::Graph`] when the edge, or an edge of one of its
    /// indexed triangles, is missing.
    pub fn flip(graph: &mut SignedGraph, index: &mut TriangleIndex, edge: EdgeKey) -> Result<Sign> {
        let sign = graph.flip_edge(edge.low(), edge.high())?;
        index.refresh_edge(graph, edge)?;
        Ok(sign)
    }
}

/// Validates a target ratio against `[0, 1]`.
pub(crate) fn validate_target(target: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&target) {
        Ok(target)
    } else {
        Err(HararyError::InvalidTargetRatio { got: target })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::{SeedableRng, rngs::SmallRng};
    use rstest::rstest;

    use super::*;
    use crate::{
        CommunityBalancer, DensitySparsifier, PartitionMethod, Triangle,
        test_utils::suite_proptest_config,
    };

    fn positive_complete(node_count: usize) -> (SignedGraph, TriangleIndex) {
        let graph = SignedGraph::complete(node_count, |_, _| Sign::Positive);
        let index = TriangleIndex::rebuild(&graph);
        (graph, index)
    }

    #[test]
    fn six_node_scenario_moves_towards_target() {
        let balancer = CommunityBalancer::new(PartitionMethod::Prefix { size: 3 });
        let sparsifier = DensitySparsifier::new(0.6).expect("density is valid");
        let mut checked = 0;
        for seed in 0..32 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut graph = balancer.build(6, &mut rng);
            if sparsifier.sparsify(&mut graph, &mut rng).is_err() {
                continue;
            }
            let mut index = TriangleIndex::rebuild(&graph);
            let Ok(initial) = index.unbalanced_ratio() else {
                continue;
            };
            assert_eq!(initial, 0.0);

            let outcome = BalancePerturbator::new()
                .perturb(&mut graph, &mut index, 0.5, &mut rng)
                .expect("triangles exist");
            assert!(outcome.flips() >= 1);
            match outcome.status() {
                TargetStatus::Reached => assert!(outcome.ratio() >= 0.5),
                TargetStatus::Unreachable { achieved, .. } => {
                    assert_eq!(achieved, outcome.ratio());
                    assert!(achieved < 0.5);
                }
            }
            assert!(index.consistent_with(&graph));
            checked += 1;
        }
        assert!(checked > 0);
    }

    #[test]
    fn flipping_a_lone_triangle_edge_unbalances_it() {
        let mut graph = SignedGraph::with_nodes(4);
        for (left, right) in [(0, 1), (0, 2), (1, 2), (2, 3)] {
            graph
                .add_edge(left, right, Sign::Positive)
                .expect("edges are valid");
        }
        let mut index = TriangleIndex::rebuild(&graph);
        assert_eq!(index.unbalanced_ratio(), Ok(0.0));

        let edge = EdgeKey::new(0, 1).expect("distinct endpoints");
        let sign = BalancePerturbator::flip(&mut graph, &mut index, edge).expect("edge exists");

        assert_eq!(sign, Sign::Negative);
        assert_eq!(index.unbalanced_ratio(), Ok(1.0));
        let triangle = Triangle::new(0, 1, 2).expect("distinct nodes");
        assert_eq!(index.sign_of(&triangle), Some(Sign::Negative));
    }

    #[test]
    fn lone_triangle_reaches_full_imbalance_in_one_flip() {
        let (mut graph, mut index) = positive_complete(3);
        let outcome = BalancePerturbator::new()
            .perturb(&mut graph, &mut index, 1.0, &mut SmallRng::seed_from_u64(2))
            .expect("triangle exists");
        assert_eq!(outcome.status(), TargetStatus::Reached);
        assert_eq!(outcome.flips(), 1);
        assert_eq!(outcome.attempts(), 1);
        assert_eq!(graph.edges().filter(|e| e.sign() == Sign::Negative).count(), 1);
    }

    #[test]
    fn zero_target_needs_no_flips() {
        let (mut graph, mut index) = positive_complete(5);
        let outcome = BalancePerturbator::new()
            .perturb(&mut graph, &mut index, 0.0, &mut SmallRng::seed_from_u64(0))
            .expect("triangles exist");
        assert_eq!(outcome.status(), TargetStatus::Reached);
        assert_eq!(outcome.flips(), 0);
        assert_eq!(outcome.attempts(), 0);
    }

    #[test]
    fn exhausted_budget_reports_achieved_ratio() {
        // Any edge of an all-positive K4 lies on two balanced triangles.
        let (mut graph, mut index) = positive_complete(4);
        let outcome = BalancePerturbator::new()
            .with_attempt_budget(1)
            .perturb(&mut graph, &mut index, 1.0, &mut SmallRng::seed_from_u64(8))
            .expect("triangles exist");
        assert_eq!(
            outcome.status(),
            TargetStatus::Unreachable {
                achieved: 0.5,
                reason: UnreachableReason::AttemptBudgetExhausted,
            }
        );
        assert_eq!(outcome.flips(), 1);
    }

    #[test]
    fn step_without_balanced_triangles_is_exhausted() {
        let (mut graph, _) = positive_complete(3);
        graph.flip_edge(1, 2).expect("edge exists");
        let mut index = TriangleIndex::rebuild(&graph);
        assert_eq!(index.balanced_count(), 0);
        let step = BalancePerturbator::new()
            .step(&mut graph, &mut index, &mut SmallRng::seed_from_u64(1))
            .expect("index matches graph");
        assert_eq!(step, StepOutcome::Exhausted);
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.5)]
    #[case(f64::NAN)]
    fn rejects_invalid_targets(#[case] target: f64) {
        let (mut graph, mut index) = positive_complete(4);
        let err = BalancePerturbator::new()
            .perturb(&mut graph, &mut index, target, &mut SmallRng::seed_from_u64(0))
            .expect_err("target must be rejected");
        assert!(matches!(err, HararyError::InvalidTargetRatio { .. }));
    }

    #[test]
    fn triangle_free_graph_has_undefined_ratio() {
        let mut graph = SignedGraph::with_nodes(3);
        graph.add_edge(0, 1, Sign::Positive).expect("edge is valid");
        graph.add_edge(1, 2, Sign::Positive).expect("edge is valid");
        let mut index = TriangleIndex::rebuild(&graph);
        let err = BalancePerturbator::new()
            .perturb(&mut graph, &mut index, 0.5, &mut SmallRng::seed_from_u64(0))
            .expect_err("no triangles");
        assert_eq!(err, HararyError::UndefinedRatio);
    }

    #[rstest]
    #[case(None, 1024)]
    #[case(Some(3), 3)]
    fn attempt_budget_defaults_scale_with_triangles(
        #[case] configured: Option<usize>,
        #[case] expected_for_ten: usize,
    ) {
        let perturbator = configured.map_or_else(BalancePerturbator::new, |budget| {
            BalancePerturbator::new().with_attempt_budget(budget)
        });
        assert_eq!(perturbator.attempt_budget(10), expected_for_ten);
        if configured.is_none() {
            assert_eq!(perturbator.attempt_budget(100), 6400);
        }
    }

    #[test]
    fn unconditional_policy_applies_every_proposal() {
        let balancer = CommunityBalancer::new(PartitionMethod::Prefix { size: 4 });
        let mut rng = SmallRng::seed_from_u64(21);
        let mut graph = balancer.build(9, &mut rng);
        let mut index = TriangleIndex::rebuild(&graph);
        let outcome = BalancePerturbator::new()
            .with_policy(FlipPolicy::Unconditional)
            .with_attempt_budget(12)
            .perturb(&mut graph, &mut index, 1.0, &mut rng)
            .expect("triangles exist");
        assert_eq!(outcome.flips(), outcome.attempts());
        assert!(index.consistent_with(&graph));
    }

    #[test]
    fn default_policy_filters_the_walk() {
        assert_eq!(FlipPolicy::default(), FlipPolicy::NonDecreasing);
        assert_eq!(BalancePerturbator::new().policy(), FlipPolicy::NonDecreasing);
        assert_eq!(BalancePerturbator::default(), BalancePerturbator::new());
    }

    proptest! {
        #![proptest_config(suite_proptest_config(48))]

        #[test]
        fn unconditional_steps_are_never_rejected(
            seed in any::<u64>(),
            node_count in 4usize..10,
            steps in 1usize..40,
        ) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut graph = CommunityBalancer::new(PartitionMethod::Prefix { size: 2 })
                .build(node_count, &mut rng);
            let mut index = TriangleIndex::rebuild(&graph);
            let perturbator = BalancePerturbator::new().with_policy(FlipPolicy::Unconditional);

            for _ in 0..steps {
                let outcome = perturbator
                    .step(&mut graph, &mut index, &mut rng)
                    .map_err(|err| TestCaseError::fail(err.to_string()))?;
                prop_assert!(!matches!(outcome, StepOutcome::Rejected(_)));
                if outcome == StepOutcome::Exhausted {
                    break;
                }
            }
            prop_assert!(index.consistent_with(&graph));
        }

        #[test]
        #[expect(clippy::integer_division, reason = "the draw count may floor")]
        fn non_decreasing_steps_never_lower_the_ratio(
            seed in any::<u64>(),
            node_count in 4usize..11,
            steps in 1usize..60,
        ) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let balancer = CommunityBalancer::new(PartitionMethod::RandomDraws {
                draws: node_count / 2,
            });
            let mut graph = balancer.build(node_count, &mut rng);
            let mut index = TriangleIndex::rebuild(&graph);
            let perturbator = BalancePerturbator::new();

            let mut unbalanced = index.unbalanced_count();
            for _ in 0..steps {
                let outcome = perturbator
                    .step(&mut graph, &mut index, &mut rng)
                    .map_err(|err| TestCaseError::fail(err.to_string()))?;
                prop_assert!(index.unbalanced_count() >= unbalanced);
                if let StepOutcome::Rejected(_) = outcome {
                    prop_assert_eq!(index.unbalanced_count(), unbalanced);
                }
                unbalanced = index.unbalanced_count();
                if outcome == StepOutcome::Exhausted {
                    break;
                }
            }
            prop_assert!(index.consistent_with(&graph));
        }

        #[test]
        fn outcome_status_matches_ratio(
            seed in any::<u64>(),
            node_count in 3usize..10,
            target in 0.0f64..=1.0,
        ) {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut graph = CommunityBalancer::new(PartitionMethod::Prefix { size: 2 })
                .build(node_count, &mut rng);
            let mut index = TriangleIndex::rebuild(&graph);
            let outcome = BalancePerturbator::new()
                .perturb(&mut graph, &mut index, target, &mut rng)
                .map_err(|err| TestCaseError::fail(err.to_string()))?;
            prop_assert_eq!(Ok(outcome.ratio()), index.unbalanced_ratio());
            match outcome.status() {
                TargetStatus::Reached => prop_assert!(outcome.ratio() >= target),
                TargetStatus::Unreachable { achieved, .. } => {
                    prop_assert!(achieved < target);
                    prop_assert_eq!(achieved, outcome.ratio());
                }
            }
        }
    }
}
