//! Benchmark support crate for harary.
//!
//! Provides parameter types and sparsified graph fixtures used by the
//! Criterion benchmarks for triangle indexing and batch generation.

pub mod error;
pub mod fixture;
pub mod params;
