//! Error types for the harary core library.
//!
//! Defines the error enums exposed by the public API, their stable codes, and
//! a convenient result alias.

use std::fmt;

use thiserror::Error;

use crate::builder::ExecutionStrategy;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced when mutating a [`crate::SignedGraph`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GraphError {
    /// Both endpoints of the requested edge were the same node.
    #[error("self loop on node {node} is not allowed")]
    SelfLoop {
        /// The node referenced twice.
        node: usize,
    },
    /// An endpoint was outside `[0, node_count)`.
    #[error("node {node} is out of range for a graph of {node_count} nodes")]
    NodeOutOfRange {
        /// The offending node id.
        node: usize,
        /// Number of nodes in the graph.
        node_count: usize,
    },
    /// The edge was already present.
    #[error("edge ({left}, {right}) already exists")]
    DuplicateEdge {
        /// Smaller endpoint.
        left: usize,
        /// Larger endpoint.
        right: usize,
    },
    /// The edge was not present.
    #[error("edge ({left}, {right}) does not exist")]
    MissingEdge {
        /// Smaller endpoint.
        left: usize,
        /// Larger endpoint.
        right: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// Both endpoints of the requested edge were the same node.
        SelfLoop => SelfLoop { .. } => "GRAPH_SELF_LOOP",
        /// An endpoint was outside the node range.
        NodeOutOfRange => NodeOutOfRange { .. } => "GRAPH_NODE_OUT_OF_RANGE",
        /// The edge was already present.
        DuplicateEdge => DuplicateEdge { .. } => "GRAPH_DUPLICATE_EDGE",
        /// The edge was not present.
        MissingEdge => MissingEdge { .. } => "GRAPH_MISSING_EDGE",
    }
}

/// Error type produced when configuring or running a generation.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum HararyError {
    /// Fewer than two nodes were requested.
    #[error("node_count must be at least 2 (got {got})")]
    InvalidNodeCount {
        /// The rejected node count.
        got: usize,
    },
    /// The target density was outside the open interval `(0, 1)`.
    #[error("target density must lie in (0, 1) (got {got})")]
    InvalidDensity {
        /// The rejected density.
        got: f64,
    },
    /// A target unbalanced ratio was outside `[0, 1]`.
    #[error("target unbalanced ratio must lie in [0, 1] (got {got})")]
    InvalidTargetRatio {
        /// The rejected ratio.
        got: f64,
    },
    /// No target ratio was configured.
    #[error("the target schedule must contain at least one ratio")]
    EmptyTargetSchedule,
    /// The target schedule decreased between two consecutive entries.
    #[error("target schedule must be non-decreasing ({previous} is followed by {next})")]
    DescendingTargetSchedule {
        /// The earlier, larger ratio.
        previous: f64,
        /// The later, smaller ratio.
        next: f64,
    },
    /// Zero instances were requested.
    #[error("instance count must be at least 1 (got {got})")]
    InvalidInstanceCount {
        /// The rejected instance count.
        got: usize,
    },
    /// A partition method was configured with a zero size.
    #[error("partition size must be at least 1 (got {got})")]
    InvalidPartitionSize {
        /// The rejected partition size.
        got: usize,
    },
    /// The requested execution strategy is unavailable in the current build.
    #[error("the requested execution strategy {requested:?} is not available in this build")]
    BackendUnavailable {
        /// Strategy that could not be satisfied by the current build.
        requested: ExecutionStrategy,
    },
    /// The target density leaves fewer edges than a spanning tree needs.
    #[error(
        "density {target} cannot keep {node_count} nodes connected (minimum connected density is {minimum})"
    )]
    DensityUnreachable {
        /// Requested density.
        target: f64,
        /// Density of a spanning tree on `node_count` nodes.
        minimum: f64,
        /// Number of nodes in the graph.
        node_count: usize,
    },
    /// Sparsification split the graph into several components.
    #[error("graph is disconnected after sparsification ({components} components at density {density})")]
    DisconnectedAfterSparsification {
        /// Number of connected components left.
        components: usize,
        /// Density reached before the connectivity check.
        density: f64,
    },
    /// The graph has no triangles, so no unbalanced ratio exists.
    #[error("graph contains no triangles; the unbalanced ratio is undefined")]
    UndefinedRatio,
    /// A graph mutation failed.
    #[error("graph mutation failed: {0}")]
    Graph(#[from] GraphError),
}

define_error_codes! {
    /// Stable codes describing [`HararyError`] variants.
    enum HararyErrorCode for HararyError {
        /// Fewer than two nodes were requested.
        InvalidNodeCount => InvalidNodeCount { .. } => "HARARY_INVALID_NODE_COUNT",
        /// The target density was outside `(0, 1)`.
        InvalidDensity => InvalidDensity { .. } => "HARARY_INVALID_DENSITY",
        /// A target ratio was outside `[0, 1]`.
        InvalidTargetRatio => InvalidTargetRatio { .. } => "HARARY_INVALID_TARGET_RATIO",
        /// No target ratio was configured.
        EmptyTargetSchedule => EmptyTargetSchedule => "HARARY_EMPTY_TARGET_SCHEDULE",
        /// The target schedule decreased.
        DescendingTargetSchedule => DescendingTargetSchedule { .. } => "HARARY_DESCENDING_TARGET_SCHEDULE",
        /// Zero instances were requested.
        InvalidInstanceCount => InvalidInstanceCount { .. } => "HARARY_INVALID_INSTANCE_COUNT",
        /// A partition method was configured with a zero size.
        InvalidPartitionSize => InvalidPartitionSize { .. } => "HARARY_INVALID_PARTITION_SIZE",
        /// The requested execution strategy is unavailable.
        BackendUnavailable => BackendUnavailable { .. } => "HARARY_BACKEND_UNAVAILABLE",
        /// The target density cannot keep the graph connected.
        DensityUnreachable => DensityUnreachable { .. } => "HARARY_DENSITY_UNREACHABLE",
        /// Sparsification disconnected the graph.
        DisconnectedAfterSparsification => DisconnectedAfterSparsification { .. } => "HARARY_DISCONNECTED",
        /// The graph has no triangles.
        UndefinedRatio => UndefinedRatio => "HARARY_UNDEFINED_RATIO",
        /// A graph mutation failed.
        GraphFailure => Graph { .. } => "HARARY_GRAPH_FAILURE",
    }
}

impl HararyError {
    /// Retrieve the inner [`GraphErrorCode`] when the error originated in the graph store.
    #[must_use]
    pub const fn graph_code(&self) -> Option<GraphErrorCode> {
        match self {
            Self::Graph(error) => Some(error.code()),
            _ => None,
        }
    }

    /// Returns `true` when a fresh attempt from a new balanced graph may
    /// succeed where this one failed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DisconnectedAfterSparsification { .. } | Self::UndefinedRatio
        )
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, HararyError>;
