//! Adjoint storage variants.
//!
//! An adjoint storage maps identifiers (virtual memory addresses) to
//! accumulator values, with unset entries reading as zero. The variants
//! differ in backing structure and lifetime:
//!
//! | Variant | Backing | Lifetime |
//! |---------|---------|----------|
//! | [`TemporaryVector`] | `Vec<f64>`, direct indexing | one evaluation |
//! | [`PersistentVector`] | worker-owned `Vec<f64>`, direct indexing | whole run |
//! | [`PersistentVectorOffset`] | worker-owned `Vec<f64>`, offset indexing | whole run |
//! | [`TemporaryMapOrdered`] | `BTreeMap` | one evaluation |
//! | [`TemporaryMapUnordered`] | `HashMap` | one evaluation |
//!
//! The two remap strategies reuse [`TemporaryVector`] after the tape's
//! identifiers have been compressed to a dense range; see
//! [`crate::strategy`].

mod map;
mod vector;

pub use map::{TemporaryMapOrdered, TemporaryMapUnordered};
pub use vector::{PersistentVector, PersistentVectorOffset, TemporaryVector};

/// Capability set shared by all adjoint storage variants.
///
/// Vector-backed implementations index directly (or via an offset) into a
/// buffer and panic on an identifier beyond their sized capacity; that is
/// a sizing contract violation by the dispatcher and must fail loudly
/// rather than corrupt unrelated adjoints. Map-backed implementations
/// need no sizing and treat absent keys as zero.
pub trait AdjointStore {
    /// Reads the adjoint accumulated at `identifier` (zero if never written).
    fn read(&self, identifier: crate::tape::Identifier) -> f64;

    /// Writes the adjoint at `identifier`, overwriting any previous value.
    fn write(&mut self, identifier: crate::tape::Identifier, value: f64);

    /// Sizes the storage to hold `len` slots. No-op for map variants.
    fn resize(&mut self, len: usize);

    /// Releases the backing storage.
    fn clear(&mut self);
}
