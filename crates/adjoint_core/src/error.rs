//! Error types for tape construction and strategy dispatch.
//!
//! This module provides:
//! - `TapeError`: errors from tape generation and construction
//! - `StrategyError`: errors from strategy selection
//!
//! All failure modes here are configuration or programmer errors. They are
//! surfaced immediately and never recovered from; this crate has no
//! retryable failures.

use thiserror::Error;

use crate::tape::Identifier;

/// Tape construction errors.
///
/// # Variants
/// - `InvalidRange`: identifier range lower bound exceeds upper bound
/// - `EmptyTape`: requested tape size of zero
/// - `LengthMismatch`: identifier and jacobian sequences differ in length
///
/// # Examples
/// ```
/// use adjoint_core::{Tape, TapeError};
///
/// let err = Tape::generate(10, 80, 20, 42).unwrap_err();
/// assert_eq!(err, TapeError::InvalidRange { i_min: 80, i_max: 20 });
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TapeError {
    /// Identifier range lower bound exceeds upper bound.
    #[error("invalid identifier range: i_min = {i_min} exceeds i_max = {i_max}")]
    InvalidRange {
        /// Lower bound of the requested range.
        i_min: Identifier,
        /// Upper bound of the requested range.
        i_max: Identifier,
    },

    /// A tape must record at least one operation.
    #[error("tape size must be at least 1")]
    EmptyTape,

    /// Identifier and jacobian sequences must be parallel.
    #[error("length mismatch: {identifiers} identifiers vs {jacobians} jacobians")]
    LengthMismatch {
        /// Length of the identifier sequence.
        identifiers: usize,
        /// Length of the jacobian sequence.
        jacobians: usize,
    },
}

/// Strategy selection errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StrategyError {
    /// Strategy tag or name not among the seven known strategies.
    #[error("unknown evaluation strategy: {tag}")]
    UnknownStrategy {
        /// The unrecognised tag or name as given.
        tag: String,
    },
}
