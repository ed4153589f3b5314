//! # Adjoint Core
//!
//! Tape data model and adjoint storage variants for local preaccumulations.
//!
//! This crate provides:
//! - [`Tape`]: a synthetic Jacobian tape of a single-input, single-output
//!   chain of unary operations, with deterministic generation and
//!   in-place identifier remapping
//! - [`AdjointStore`]: the capability set shared by all adjoint storage
//!   variants (indexed read/write, resize, clear)
//! - Seven storage strategies differing in backing structure and lifetime,
//!   dispatched through [`Evaluator`]
//!
//! ## Auto-zeroing contract
//!
//! Every storage variant leaves each location it touched during a tape
//! evaluation at exactly zero before the call returns, so an instance can
//! be reused for the next evaluation without a full clear. The persistent
//! vector variants keep their backing buffer alive across evaluations and
//! release it only at [`Evaluator::teardown`].

#![warn(missing_docs)]

pub mod error;
pub mod storage;
pub mod strategy;
pub mod tape;

pub use error::{StrategyError, TapeError};
pub use storage::AdjointStore;
pub use strategy::{Evaluator, Strategy};
pub use tape::{Identifier, RemapKind, Tape};
