//! Integration tests for the graph generator.

mod common;

use common::small_batch;
use harary_core::{
    ExecutionStrategy, FlipPolicy, GenerationMode, GeneratorBuilder, HararyError, PartitionMethod,
    SignedGraph, Snapshot, SnapshotLabel, TargetStatus, TriangleIndex, UnreachableReason,
};
use harary_test_support::tracing::capture;
use rstest::rstest;

fn rebuild(snapshot: &Snapshot, node_count: usize) -> SignedGraph {
    let mut graph = SignedGraph::with_nodes(node_count);
    for edge in snapshot.edges() {
        graph
            .add_edge(edge.source(), edge.target(), edge.sign())
            .expect("snapshot edges are valid");
    }
    graph
}

#[rstest]
#[case::single_node(GeneratorBuilder::new().with_node_count(1), "HARARY_INVALID_NODE_COUNT")]
#[case::zero_density(GeneratorBuilder::new().with_target_density(0.0), "HARARY_INVALID_DENSITY")]
#[case::full_density(GeneratorBuilder::new().with_target_density(1.0), "HARARY_INVALID_DENSITY")]
#[case::below_tree(
    GeneratorBuilder::new().with_node_count(10).with_target_density(0.1),
    "HARARY_DENSITY_UNREACHABLE",
)]
#[case::ratio_above_one(GeneratorBuilder::new().with_target_ratio(1.5), "HARARY_INVALID_TARGET_RATIO")]
#[case::empty_schedule(
    GeneratorBuilder::new().with_target_schedule(Vec::new()),
    "HARARY_EMPTY_TARGET_SCHEDULE",
)]
#[case::descending_schedule(
    GeneratorBuilder::new().with_target_schedule([0.4, 0.2]),
    "HARARY_DESCENDING_TARGET_SCHEDULE",
)]
#[case::no_instances(GeneratorBuilder::new().with_instances(0), "HARARY_INVALID_INSTANCE_COUNT")]
#[case::empty_partition(
    GeneratorBuilder::new().with_partition(PartitionMethod::Prefix { size: 0 }),
    "HARARY_INVALID_PARTITION_SIZE",
)]
fn invalid_configurations_are_rejected(#[case] builder: GeneratorBuilder, #[case] code: &str) {
    let err = builder.build().expect_err("configuration must be rejected");
    assert_eq!(err.code().as_str(), code);
}

#[test]
fn defaults_describe_the_reference_batch() {
    let generator = GeneratorBuilder::new().build().expect("defaults are valid");
    assert_eq!(generator.target().node_count(), 30);
    assert_eq!(generator.target().target_density(), 0.3);
    assert_eq!(generator.target().target_ratios(), [0.5]);
    assert_eq!(generator.instances(), 10);
    assert_eq!(generator.mode(), GenerationMode::Single);
    assert_eq!(generator.retries(), 0);
}

#[test]
fn single_mode_emits_connected_graphs_at_the_target_density() {
    let report = small_batch()
        .with_target_ratio(0.4)
        .build()
        .expect("configuration is valid")
        .run()
        .expect("batch runs");

    assert!(report.failures().is_empty());
    assert_eq!(report.instances().len(), 4);
    for (expected, instance) in report.instances().iter().enumerate() {
        assert_eq!(instance.instance(), expected);
        assert!(instance.density() <= 0.6);
        let [snapshot] = instance.snapshots() else {
            panic!("single mode emits exactly one snapshot");
        };
        assert_eq!(snapshot.label(), SnapshotLabel::Target(0.4));

        let graph = rebuild(snapshot, 12);
        assert_eq!(graph.edge_count(), 39);
        assert!(graph.is_connected());

        let ratio = TriangleIndex::rebuild(&graph)
            .unbalanced_ratio()
            .expect("graph has triangles");
        assert_eq!(ratio, snapshot.ratio());
        if snapshot.status().is_reached() {
            assert!(ratio >= 0.4);
        }
    }
}

#[test]
fn sequence_mode_starts_balanced_and_never_decreases() {
    let report = small_batch()
        .with_target_schedule([0.1, 0.3, 0.3, 0.6])
        .build()
        .expect("configuration is valid")
        .run()
        .expect("batch runs");

    assert_eq!(report.mode(), GenerationMode::Sequence);
    assert!(report.failures().is_empty());
    for instance in report.instances() {
        let snapshots = instance.snapshots();
        assert_eq!(snapshots.len(), 5);
        assert_eq!(snapshots[0].label(), SnapshotLabel::Baseline);
        assert_eq!(snapshots[0].ratio(), 0.0);
        assert_eq!(snapshots[0].flips(), 0);
        for pair in snapshots.windows(2) {
            assert!(pair[0].ratio() <= pair[1].ratio());
        }
        // Every snapshot shares the sparsified topology.
        let baseline = rebuild(&snapshots[0], 12);
        for snapshot in &snapshots[1..] {
            let graph = rebuild(snapshot, 12);
            assert!(graph.edges().all(|edge| baseline.contains_edge(edge.source(), edge.target())));
            assert_eq!(graph.edge_count(), baseline.edge_count());
        }
    }
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_and_sequential_runs_agree() {
    let sequential = small_batch()
        .with_target_schedule([0.2, 0.5])
        .build()
        .expect("configuration is valid")
        .run()
        .expect("sequential batch runs");
    let parallel = small_batch()
        .with_target_schedule([0.2, 0.5])
        .with_execution_strategy(ExecutionStrategy::Parallel)
        .build()
        .expect("configuration is valid")
        .run()
        .expect("parallel batch runs");
    assert_eq!(sequential, parallel);
}

#[test]
fn seeds_change_the_generated_graphs() {
    let run = |seed| {
        small_batch()
            .with_seed(seed)
            .with_instances(1)
            .build()
            .expect("configuration is valid")
            .run()
            .expect("batch runs")
    };
    assert_eq!(run(3), run(3));
    assert_ne!(run(3), run(4));
}

#[test]
fn triangle_free_instances_are_reported_not_fatal() {
    let report = GeneratorBuilder::new()
        .with_node_count(3)
        .with_target_density(0.7)
        .with_instances(2)
        .with_retries(1)
        .with_execution_strategy(ExecutionStrategy::Sequential)
        .build()
        .expect("configuration is valid")
        .run()
        .expect("batch runs");
    assert!(report.instances().is_empty());
    assert_eq!(report.failures().len(), 2);
    for failure in report.failures() {
        assert_eq!(failure.error(), &HararyError::UndefinedRatio);
        assert_eq!(failure.attempts(), 2);
    }
}

#[test]
fn exhausted_budgets_are_reported_with_a_warning() {
    let (report, layer) = capture(|| {
        small_batch()
            .with_instances(1)
            .with_target_ratio(1.0)
            .with_attempt_budget(1)
            .build()
            .expect("configuration is valid")
            .run()
            .expect("batch runs")
    });

    assert_eq!(report.unreachable_snapshots(), 1);
    let snapshot = &report.instances()[0].snapshots()[0];
    assert!(matches!(
        snapshot.status(),
        TargetStatus::Unreachable {
            reason: UnreachableReason::AttemptBudgetExhausted,
            ..
        }
    ));
    assert_eq!(layer.events_with_message("target unreachable").len(), 1);
    let batch = layer.events_with_message("batch complete");
    assert_eq!(batch[0].fields.get("unreachable").map(String::as_str), Some("1"));
}

#[test]
fn runs_record_their_pipeline_spans() {
    let (_, layer) = capture(|| {
        small_batch()
            .with_instances(2)
            .with_flip_policy(FlipPolicy::Unconditional)
            .build()
            .expect("configuration is valid")
            .run()
            .expect("batch runs")
    });

    let run = layer.span("core.run").expect("core.run span must close");
    assert_eq!(run.fields.get("nodes").map(String::as_str), Some("12"));
    assert_eq!(run.fields.get("instances").map(String::as_str), Some("2"));
    let spans = layer.spans();
    assert!(spans.iter().filter(|span| span.name == "core.instance").count() >= 2);
    assert!(spans.iter().any(|span| span.name == "core.sparsify"));
    assert!(spans.iter().any(|span| span.name == "core.perturb"));
}
