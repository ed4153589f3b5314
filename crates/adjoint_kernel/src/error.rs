//! Error types for simulator configuration.

use thiserror::Error;

use adjoint_core::Identifier;

/// Simulator configuration errors.
///
/// All variants indicate a broken configuration invariant and are surfaced
/// at construction time, before any parallel work starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// At least one preaccumulation is required.
    #[error("n_preaccs must be at least 1")]
    NoPreaccumulations,

    /// Tape sizes of zero are disallowed.
    #[error("preaccumulation size minimum must be at least 1")]
    ZeroPreaccSize,

    /// Size range lower bound exceeds upper bound.
    #[error("preaccumulation size range is empty: {min} > {max}")]
    EmptySizeRange {
        /// Lower bound of the size range.
        min: usize,
        /// Upper bound of the size range.
        max: usize,
    },

    /// Evaluation count range lower bound exceeds upper bound.
    #[error("evaluation count range is empty: {min} > {max}")]
    EmptyEvalRange {
        /// Lower bound of the evaluation count range.
        min: usize,
        /// Upper bound of the evaluation count range.
        max: usize,
    },

    /// Identifier range lower bound exceeds upper bound.
    #[error("identifier range is empty: {i_min} > {i_max}")]
    EmptyIdentifierRange {
        /// Lower bound of the identifier range.
        i_min: Identifier,
        /// Upper bound of the identifier range.
        i_max: Identifier,
    },
}
