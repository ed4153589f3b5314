//! # Adjoint Kernel
//!
//! Parallel simulator for simultaneous local preaccumulations.
//!
//! This crate provides:
//! - [`PreaccConfig`]: workload configuration with builder and validation
//! - [`SeedPlan`]: deterministic per-tape seed derivation, thread-count
//!   independent under the precomputed policy
//! - [`PreaccSimulator`]: generates many independent tapes, evaluates each
//!   one or more times under a chosen storage strategy across a rayon
//!   worker pool, and reduces a scalar checksum
//!
//! ## Determinism
//!
//! The generated workload (tape sizes, identifiers, jacobians, evaluation
//! counts) is fully determined by the configuration seed and independent of
//! the worker count under [`SeedPolicy::Precomputed`]. Only the summation
//! order of the final checksum varies with scheduling, an accepted source
//! of last-bit floating-point nondeterminism.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod seeds;
pub mod simulator;

pub use config::{PreaccConfig, PreaccConfigBuilder, SeedPolicy};
pub use error::ConfigError;
pub use seeds::SeedPlan;
pub use simulator::{PreaccDraw, PreaccSimulator};
