//! Command implementations and argument parsing for the harary CLI.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use harary_core::{
    BatchReport, DEFAULT_COMMUNITY_SIZE, DEFAULT_DENSITY, DEFAULT_INSTANCES, DEFAULT_NODE_COUNT,
    DEFAULT_TARGET_RATIO, ExecutionStrategy, FlipPolicy, GenerationMode, GeneratorBuilder,
    HararyError, PartitionMethod, SnapshotLabel, TargetStatus, TriangleIndex,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use crate::edge_list::{EdgeListError, read_edges, sequence_file_name, single_file_name, write_edges};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "harary",
    about = "Generate signed graphs with a calibrated share of unbalanced triangles."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate graphs perturbed towards a single unbalanced ratio.
    Generate(GenerateCommand),
    /// Generate, per instance, a sequence of increasingly unbalanced graphs.
    Sequence(SequenceCommand),
    /// Report statistics of an existing `u,v,sign` edge list.
    Inspect(InspectCommand),
}

/// Options shared by the generating commands.
#[derive(Debug, Args, Clone)]
pub struct GenerationArgs {
    /// Number of nodes per graph.
    #[arg(long, default_value_t = DEFAULT_NODE_COUNT)]
    pub nodes: usize,

    /// Edge density to sparsify down to, in (0, 1).
    #[arg(long, default_value_t = DEFAULT_DENSITY)]
    pub density: f64,

    /// Number of independent graphs to generate.
    #[arg(long, default_value_t = DEFAULT_INSTANCES)]
    pub instances: usize,

    /// How nodes are split into the two communities.
    #[arg(long, value_enum, default_value_t = PartitionKind::Prefix)]
    pub partition: PartitionKind,

    /// Size of the first community, or number of draws for `random`.
    /// Defaults to 15 for `prefix` and to one less than `nodes` for `random`.
    #[arg(long = "community-size")]
    pub community_size: Option<usize>,

    /// Batch seed every instance seed is derived from.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// How instances are scheduled.
    #[arg(long, value_enum, default_value_t = StrategyKind::Auto)]
    pub strategy: StrategyKind,

    /// Extra attempts for instances that end up disconnected or triangle-free.
    #[arg(long, default_value_t = 0)]
    pub retries: usize,

    /// Whether flips that lower the unbalanced ratio are allowed.
    #[arg(long, value_enum, default_value_t = PolicyKind::NonDecreasing)]
    pub policy: PolicyKind,

    /// Maximum flip proposals per target (defaults to 64 per triangle).
    #[arg(long = "attempt-budget")]
    pub attempt_budget: Option<usize>,

    /// Directory the edge lists are written to.
    #[arg(long = "out-dir")]
    pub out_dir: Option<PathBuf>,
}

/// Options accepted by the `generate` command.
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Shared generation options.
    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Target share of unbalanced triangles, in [0, 1].
    #[arg(long, default_value_t = DEFAULT_TARGET_RATIO)]
    pub ratio: f64,
}

/// Options accepted by the `sequence` command.
#[derive(Debug, Args, Clone)]
pub struct SequenceCommand {
    /// Shared generation options.
    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Non-decreasing target ratios pursued from the same base graph.
    #[arg(long, value_delimiter = ',', default_value = "0.2,0.4,0.6,0.8,1")]
    pub targets: Vec<f64>,
}

/// Options accepted by the `inspect` command.
#[derive(Debug, Args, Clone)]
pub struct InspectCommand {
    /// Path to a `u,v,sign` edge list.
    pub path: PathBuf,
}

/// Supported partition methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PartitionKind {
    /// The first `community-size` nodes form the first community.
    Prefix,
    /// `community-size` random draws, with replacement, form the first community.
    /// Without `community-size`, `nodes - 1` draws are taken.
    Random,
}

/// Supported execution strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyKind {
    /// Parallel when available.
    Auto,
    /// One instance at a time.
    Sequential,
    /// Instances fan out over a thread pool.
    Parallel,
}

/// Supported flip policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Reject flips that would lower the unbalanced ratio.
    NonDecreasing,
    /// Apply every proposed flip.
    Unconditional,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// An edge list could not be parsed.
    #[error("failed to read `{path}`: {source}")]
    EdgeList {
        /// Path of the edge list.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: EdgeListError,
    },
    /// Generation failed.
    #[error(transparent)]
    Core(#[from] HararyError),
}

/// One written snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSummary {
    /// Instance the snapshot belongs to.
    pub instance: usize,
    /// Baseline or target ratio.
    pub label: SnapshotLabel,
    /// Achieved unbalanced ratio.
    pub ratio: f64,
    /// Whether the target was reached.
    pub reached: bool,
    /// Number of edges written.
    pub edges: usize,
    /// File the edges were written to.
    pub path: PathBuf,
}

/// One instance that produced no files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSummary {
    /// Instance number.
    pub instance: usize,
    /// Attempts made.
    pub attempts: usize,
    /// Stable error code of the last failure.
    pub code: &'static str,
    /// Rendered error.
    pub message: String,
}

/// Outcome of a `generate` or `sequence` command.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    /// Directory holding the written files.
    pub out_dir: PathBuf,
    /// Written snapshots in instance and emission order.
    pub snapshots: Vec<SnapshotSummary>,
    /// Instances that failed.
    pub failures: Vec<FailureSummary>,
}

/// Statistics reported by `inspect`.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSummary {
    /// Inspected file.
    pub path: PathBuf,
    /// Number of nodes (largest id plus one).
    pub nodes: usize,
    /// Number of edges.
    pub edges: usize,
    /// Edge density.
    pub density: f64,
    /// Number of connected components.
    pub components: usize,
    /// Number of triangles.
    pub triangles: usize,
    /// Number of triangles with a negative sign product.
    pub unbalanced: usize,
    /// Share of unbalanced triangles, absent without triangles.
    pub ratio: Option<f64>,
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionSummary {
    /// A generating command ran.
    Batch(BatchSummary),
    /// An edge list was inspected.
    Inspect(GraphSummary),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when configuration, generation or file access fails.
/// Instances that fail individually are listed in the summary instead.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use harary_cli::cli::{Cli, Command, ExecutionSummary, InspectCommand, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "0,1,1\n0,2,1\n1,2,-1\n")?;
/// let cli = Cli {
///     command: Command::Inspect(InspectCommand {
///         path: file.path().to_path_buf(),
///     }),
/// };
/// let ExecutionSummary::Inspect(summary) = run_cli(cli)? else {
///     unreachable!("inspect returns graph statistics");
/// };
/// assert_eq!(summary.triangles, 1);
/// assert_eq!(summary.ratio, Some(1.0));
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Generate(command) => {
            span.record("command", field::display("generate"));
            run_generate(&command).map(ExecutionSummary::Batch)
        }
        Command::Sequence(command) => {
            span.record("command", field::display("sequence"));
            run_sequence(command).map(ExecutionSummary::Batch)
        }
        Command::Inspect(command) => {
            span.record("command", field::display("inspect"));
            run_inspect(&command).map(ExecutionSummary::Inspect)
        }
    }
}

#[instrument(
    name = "cli.run_generate",
    err,
    skip(command),
    fields(nodes = command.generation.nodes, ratio = command.ratio),
)]
pub(super) fn run_generate(command: &GenerateCommand) -> Result<BatchSummary, CliError> {
    let out_dir = out_dir(&command.generation, "data");
    let builder = configure(&command.generation).with_target_ratio(command.ratio);
    let report = builder.build()?.run()?;
    write_batch(&report, out_dir)
}

#[instrument(
    name = "cli.run_sequence",
    err,
    skip(command),
    fields(nodes = command.generation.nodes, targets = ?command.targets),
)]
pub(super) fn run_sequence(command: SequenceCommand) -> Result<BatchSummary, CliError> {
    let out_dir = out_dir(&command.generation, "data/prog_sequence");
    let builder = configure(&command.generation).with_target_schedule(command.targets);
    let report = builder.build()?.run()?;
    write_batch(&report, out_dir)
}

#[instrument(name = "cli.run_inspect", err, skip(command), fields(path = %command.path.display()))]
pub(super) fn run_inspect(command: &InspectCommand) -> Result<GraphSummary, CliError> {
    let path = &command.path;
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.clone(),
        source,
    })?;
    let graph = read_edges(BufReader::new(file)).map_err(|source| CliError::EdgeList {
        path: path.clone(),
        source,
    })?;
    let index = TriangleIndex::rebuild(&graph);
    let summary = GraphSummary {
        path: path.clone(),
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        density: graph.density(),
        components: graph.component_count(),
        triangles: index.len(),
        unbalanced: index.unbalanced_count(),
        ratio: index.unbalanced_ratio().ok(),
    };
    info!(
        nodes = summary.nodes,
        edges = summary.edges,
        triangles = summary.triangles,
        "edge list inspected"
    );
    Ok(summary)
}

pub(super) fn configure(args: &GenerationArgs) -> GeneratorBuilder {
    let partition = match args.partition {
        PartitionKind::Prefix => PartitionMethod::Prefix {
            size: args.community_size.unwrap_or(DEFAULT_COMMUNITY_SIZE),
        },
        PartitionKind::Random => args.community_size.map_or_else(
            || PartitionMethod::random_draws_for(args.nodes),
            |draws| PartitionMethod::RandomDraws { draws },
        ),
    };
    let strategy = match args.strategy {
        StrategyKind::Auto => ExecutionStrategy::Auto,
        StrategyKind::Sequential => ExecutionStrategy::Sequential,
        StrategyKind::Parallel => ExecutionStrategy::Parallel,
    };
    let policy = match args.policy {
        PolicyKind::NonDecreasing => FlipPolicy::NonDecreasing,
        PolicyKind::Unconditional => FlipPolicy::Unconditional,
    };
    let builder = GeneratorBuilder::new()
        .with_node_count(args.nodes)
        .with_target_density(args.density)
        .with_instances(args.instances)
        .with_partition(partition)
        .with_seed(args.seed)
        .with_execution_strategy(strategy)
        .with_retries(args.retries)
        .with_flip_policy(policy);
    match args.attempt_budget {
        Some(budget) => builder.with_attempt_budget(budget),
        None => builder,
    }
}

fn out_dir(args: &GenerationArgs, default: &str) -> PathBuf {
    args.out_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(default))
}

#[instrument(name = "cli.write_batch", err, skip(report, out_dir), fields(out_dir = %out_dir.display()))]
pub(super) fn write_batch(report: &BatchReport, out_dir: PathBuf) -> Result<BatchSummary, CliError> {
    fs::create_dir_all(&out_dir).map_err(|source| CliError::Io {
        path: out_dir.clone(),
        source,
    })?;

    let target = report.target();
    let mut snapshots = Vec::new();
    for instance in report.instances() {
        for snapshot in instance.snapshots() {
            let name = match report.mode() {
                GenerationMode::Single => single_file_name(
                    target.node_count(),
                    target.target_density(),
                    snapshot.label().ratio(),
                    instance.instance(),
                ),
                GenerationMode::Sequence => {
                    sequence_file_name(instance.instance(), snapshot.label())
                }
            };
            let path = out_dir.join(name);
            write_file(&path, |writer| write_edges(writer, snapshot.edges()))?;
            snapshots.push(SnapshotSummary {
                instance: instance.instance(),
                label: snapshot.label(),
                ratio: snapshot.ratio(),
                reached: matches!(snapshot.status(), TargetStatus::Reached),
                edges: snapshot.edges().len(),
                path,
            });
        }
    }

    let failures: Vec<FailureSummary> = report
        .failures()
        .iter()
        .map(|failure| FailureSummary {
            instance: failure.instance(),
            attempts: failure.attempts(),
            code: failure.error().code().as_str(),
            message: failure.error().to_string(),
        })
        .collect();

    info!(
        written = snapshots.len(),
        failed = failures.len(),
        "edge lists written"
    );
    Ok(BatchSummary {
        out_dir,
        snapshots,
        failures,
    })
}

fn write_file(
    path: &Path,
    body: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<(), CliError> {
    let io_error = |source: io::Error| CliError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    body(&mut writer).map_err(io_error)?;
    writer.flush().map_err(io_error)
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use std::path::PathBuf;
/// # use harary_cli::cli::{ExecutionSummary, GraphSummary, render_summary};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary::Inspect(GraphSummary {
///     path: PathBuf::from("demo.txt"),
///     nodes: 3,
///     edges: 3,
///     density: 1.0,
///     components: 1,
///     triangles: 1,
///     unbalanced: 0,
///     ratio: Some(0.0),
/// });
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert!(String::from_utf8(buffer)?.contains("unbalanced ratio: 0"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Batch(batch) => {
            writeln!(writer, "output: {}", batch.out_dir.display())?;
            writeln!(writer, "snapshots: {}", batch.snapshots.len())?;
            for snapshot in &batch.snapshots {
                let status = if snapshot.reached { "reached" } else { "unreachable" };
                writeln!(
                    writer,
                    "{}\t{}\t{:.4}\t{status}\t{}",
                    snapshot.instance,
                    snapshot.label,
                    snapshot.ratio,
                    snapshot.path.display()
                )?;
            }
            writeln!(writer, "failures: {}", batch.failures.len())?;
            for failure in &batch.failures {
                writeln!(
                    writer,
                    "{}\t{}\t{}",
                    failure.instance, failure.code, failure.message
                )?;
            }
        }
        ExecutionSummary::Inspect(graph) => {
            writeln!(writer, "file: {}", graph.path.display())?;
            writeln!(writer, "nodes: {}", graph.nodes)?;
            writeln!(writer, "edges: {}", graph.edges)?;
            writeln!(writer, "density: {:.4}", graph.density)?;
            writeln!(writer, "components: {}", graph.components)?;
            writeln!(writer, "triangles: {}", graph.triangles)?;
            writeln!(writer, "unbalanced: {}", graph.unbalanced)?;
            match graph.ratio {
                Some(ratio) => writeln!(writer, "unbalanced ratio: {ratio}")?,
                None => writeln!(writer, "unbalanced ratio: undefined")?,
            }
        }
    }
    Ok(())
}
