//! # Cluster Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Deterministic world fixtures
//! - Crew/ship spawning helpers
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;
