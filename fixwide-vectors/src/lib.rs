//! # fixwide-vectors
//!
//! Seeded, reproducible test vectors for `fixwide-math`.
//!
//! A vector is an operation, its inputs and the outputs the reference
//! arithmetic produces for them. Generation takes a caller-owned [`rand::Rng`];
//! [`VectorSet::generate`] builds every operation of a [`VectorConfig`] from
//! per-operation ChaCha20 streams, so a seed always regenerates the same set.
//! [`verify`] recomputes a vector and reports any disagreement.
//!
//! Nothing here touches the filesystem. Records are `serde` types; write them
//! out however the caller likes.

pub mod generate;
pub mod vector;
pub mod verify;

pub use generate::{generate, VectorSet};
pub use vector::{Operand, Operation, Result, TestVector, VectorConfig, VectorError, Width};
pub use verify::verify;
