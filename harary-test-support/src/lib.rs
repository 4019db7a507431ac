//! Shared test utilities used across harary crates.

pub mod ci;
pub mod tracing;
