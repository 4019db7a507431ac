//! Command-line interface for generating and inspecting signed graphs.
//!
//! `generate` writes one perturbed graph per instance, `sequence` writes a
//! baseline followed by one graph per target ratio, and `inspect` reports
//! the triangle statistics of an existing edge list.

mod commands;

pub use commands::{
    BatchSummary, Cli, CliError, Command, ExecutionSummary, FailureSummary, GenerateCommand,
    GenerationArgs, GraphSummary, InspectCommand, PartitionKind, PolicyKind, SequenceCommand,
    SnapshotSummary, StrategyKind, render_summary, run_cli,
};
