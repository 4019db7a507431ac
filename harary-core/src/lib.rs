//! Harary core library.
//!
//! Generates signed graphs calibrated to a target edge density and a target
//! share of unbalanced triangles. A balanced complete graph is built from a
//! two-community partition, sparsified at random while staying connected,
//! and then perturbed by sign flips until enough triangles are unbalanced.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod balancer;
mod builder;
mod error;
mod generator;
mod graph;
mod perturbator;
mod result;
mod rng;
mod sparsifier;
mod triangle;

#[cfg(test)]
mod test_utils;

pub use crate::{
    balancer::{
        Community, CommunityBalancer, CommunityPartition, DEFAULT_COMMUNITY_SIZE, PartitionMethod,
    },
    builder::{
        DEFAULT_DENSITY, DEFAULT_INSTANCES, DEFAULT_NODE_COUNT, DEFAULT_TARGET_RATIO,
        ExecutionStrategy, GenerationMode, GenerationTarget, GeneratorBuilder,
    },
    error::{GraphError, GraphErrorCode, HararyError, HararyErrorCode, Result},
    generator::Generator,
    graph::{EdgeKey, Sign, SignedEdge, SignedGraph},
    perturbator::{
        ATTEMPTS_PER_TRIANGLE, BalancePerturbator, FlipPolicy, MIN_ATTEMPT_BUDGET,
        PerturbationOutcome, StepOutcome, TargetStatus, UnreachableReason,
    },
    result::{BatchReport, InstanceFailure, InstanceReport, Snapshot, SnapshotLabel},
    rng::{instance_rng, mix_instance_seed},
    sparsifier::{DensitySparsifier, SparsificationReport, minimum_connected_density},
    triangle::{EdgeBalance, Triangle, TriangleIndex},
};
