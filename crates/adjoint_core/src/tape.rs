//! Synthetic Jacobian tape for local preaccumulation.
//!
//! A [`Tape`] resembles the Jacobian tape of a computation with a single
//! input, a single output, and only unary operations:
//!
//! ```text
//! input -> o -> o -> o -> ... -> o -> o -> o -> output
//! ```
//!
//! Each recorded step carries a virtual memory address (identifier) and a
//! local partial derivative (jacobian). Reverse evaluation propagates a
//! seed adjoint through the chain, reading and writing each adjoint
//! location exactly once.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::TapeError;
use crate::storage::AdjointStore;

/// Virtual memory address of an adjoint variable.
pub type Identifier = u32;

/// Map kind used for in-place identifier remapping.
///
/// Both kinds produce identical dense identifiers; they differ only in the
/// backing structure (and hence lookup cost) of the remap cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemapKind {
    /// Key-ordered map ([`BTreeMap`]).
    Ordered,
    /// Hash map ([`HashMap`]).
    Unordered,
}

/// A recorded chain of unary operations.
///
/// `identifiers` and `jacobians` are parallel sequences of equal, non-zero
/// length. The tape is immutable after generation except for
/// [`Tape::remap_identifiers`], which rewrites the identifiers in place.
///
/// # Examples
///
/// ```rust
/// use adjoint_core::{storage::TemporaryVector, AdjointStore, Tape};
///
/// let tape = Tape::generate(10, 20, 80, 42).unwrap();
///
/// let mut adjoints = TemporaryVector::new();
/// adjoints.resize(tape.max_identifier() as usize + 1);
///
/// let result = tape.evaluate(&mut adjoints, 1.0);
/// assert!((result - tape.jacobian_product()).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct Tape {
    identifiers: Vec<Identifier>,
    jacobians: Vec<f64>,
    remapped: bool,
}

impl Tape {
    /// Generates a tape of `size` steps, drawing identifiers uniformly from
    /// the inclusive range `[i_min, i_max]`.
    ///
    /// Jacobians are kept in a neighbourhood of 1.0 via
    /// `1.0 + 0.1 * sin(identifier)`, so products over the tape neither
    /// vanish nor blow up. Deterministic with respect to `seed`: identical
    /// arguments always yield an identical tape.
    ///
    /// # Errors
    ///
    /// - [`TapeError::EmptyTape`] if `size == 0`
    /// - [`TapeError::InvalidRange`] if `i_min > i_max`
    pub fn generate(
        size: usize,
        i_min: Identifier,
        i_max: Identifier,
        seed: u64,
    ) -> Result<Self, TapeError> {
        if size == 0 {
            return Err(TapeError::EmptyTape);
        }
        if i_min > i_max {
            return Err(TapeError::InvalidRange { i_min, i_max });
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let distribution = Uniform::new_inclusive(i_min, i_max);

        let mut identifiers = Vec::with_capacity(size);
        let mut jacobians = Vec::with_capacity(size);
        for _ in 0..size {
            let identifier = distribution.sample(&mut rng);
            identifiers.push(identifier);
            jacobians.push(1.0 + 0.1 * f64::from(identifier).sin());
        }

        Ok(Self {
            identifiers,
            jacobians,
            remapped: false,
        })
    }

    /// Builds a tape from explicit identifier and jacobian sequences.
    ///
    /// # Errors
    ///
    /// - [`TapeError::EmptyTape`] if the sequences are empty
    /// - [`TapeError::LengthMismatch`] if the sequences differ in length
    pub fn from_parts(identifiers: Vec<Identifier>, jacobians: Vec<f64>) -> Result<Self, TapeError> {
        if identifiers.len() != jacobians.len() {
            return Err(TapeError::LengthMismatch {
                identifiers: identifiers.len(),
                jacobians: jacobians.len(),
            });
        }
        if identifiers.is_empty() {
            return Err(TapeError::EmptyTape);
        }
        Ok(Self {
            identifiers,
            jacobians,
            remapped: false,
        })
    }

    /// Performs the tape evaluation on the given adjoint variables with the
    /// given seed.
    ///
    /// Reads and writes each adjoint memory location exactly once and
    /// auto-zeroes every touched location, so the storage is handed back
    /// exactly as it was received. The result equals
    /// `seed * product(jacobians)`.
    ///
    /// The read-before-zero-before-write order in the loop body is the
    /// correctness-critical contract: `identifiers[i] == identifiers[i - 1]`
    /// is legal (an operation may reuse its predecessor's address) and the
    /// in-flight adjoint must not be lost in that case.
    pub fn evaluate<S: AdjointStore>(&self, adjoints: &mut S, seed: f64) -> f64 {
        adjoints.write(self.identifiers[0], seed * self.jacobians[0]);
        for i in 1..self.identifiers.len() {
            let identifier = self.identifiers[i];
            let predecessor = self.identifiers[i - 1];

            // account for the case identifier == predecessor
            let temp = adjoints.read(predecessor);
            adjoints.write(predecessor, 0.0);
            adjoints.write(identifier, temp * self.jacobians[i]);
        }
        let last = self.identifiers[self.identifiers.len() - 1];
        let result = adjoints.read(last);
        adjoints.write(last, 0.0);
        result
    }

    /// Edits the tape, remapping identifiers in place to the dense range
    /// `1..=K` where `K` is the number of distinct identifiers.
    ///
    /// First-occurrence order is preserved and repeated identifiers map to
    /// the same dense value, so re-evaluating the remapped tape yields the
    /// same scalar result. Both [`RemapKind`]s produce identical dense
    /// identifiers. Safe to invoke repeatedly: once remapped, identifiers
    /// round-trip to themselves.
    pub fn remap_identifiers(&mut self, kind: RemapKind) {
        match kind {
            RemapKind::Ordered => {
                let mut cache: BTreeMap<Identifier, Identifier> = BTreeMap::new();
                let mut next: Identifier = 1;
                for identifier in &mut self.identifiers {
                    *identifier = *cache.entry(*identifier).or_insert_with(|| {
                        let dense = next;
                        next += 1;
                        dense
                    });
                }
            }
            RemapKind::Unordered => {
                let mut cache: HashMap<Identifier, Identifier> = HashMap::new();
                let mut next: Identifier = 1;
                for identifier in &mut self.identifiers {
                    *identifier = *cache.entry(*identifier).or_insert_with(|| {
                        let dense = next;
                        next += 1;
                        dense
                    });
                }
            }
        }
        self.remapped = true;
    }

    /// Whether [`Tape::remap_identifiers`] has run on this tape.
    ///
    /// The dispatcher uses this flag as its at-most-once remap cache: a
    /// fresh tape always remaps, subsequent evaluations of the same tape
    /// never re-remap.
    #[inline]
    pub fn is_remapped(&self) -> bool {
        self.remapped
    }

    /// Maximum identifier currently on the tape; sizes vector storage.
    pub fn max_identifier(&self) -> Identifier {
        self.identifiers.iter().copied().max().unwrap_or(0)
    }

    /// Minimum identifier currently on the tape; offset for offset-addressed
    /// vector storage.
    pub fn min_identifier(&self) -> Identifier {
        self.identifiers.iter().copied().min().unwrap_or(0)
    }

    /// Number of recorded steps.
    #[inline]
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    /// A tape is never empty by construction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    /// The identifier sequence.
    #[inline]
    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    /// The jacobian sequence.
    #[inline]
    pub fn jacobians(&self) -> &[f64] {
        &self.jacobians
    }

    /// Product of all jacobians: the value every evaluation with seed 1.0
    /// must reproduce.
    pub fn jacobian_product(&self) -> f64 {
        self.jacobians.iter().product()
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (identifier, jacobian) in self.identifiers.iter().zip(&self.jacobians) {
            writeln!(f, "{:>10} {}", identifier, jacobian)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TemporaryVector;
    use approx::assert_relative_eq;

    #[test]
    fn test_generate_deterministic() {
        let a = Tape::generate(10, 20, 80, 42).unwrap();
        let b = Tape::generate(10, 20, 80, 42).unwrap();
        assert_eq!(a.identifiers(), b.identifiers());
        assert_eq!(a.jacobians(), b.jacobians());
    }

    #[test]
    fn test_generate_respects_range() {
        let tape = Tape::generate(1000, 20, 80, 7).unwrap();
        assert!(tape.identifiers().iter().all(|&i| (20..=80).contains(&i)));
        assert!(tape.max_identifier() <= 80);
        assert!(tape.min_identifier() >= 20);
    }

    #[test]
    fn test_generate_jacobians_near_one() {
        let tape = Tape::generate(1000, 1, 1000, 7).unwrap();
        for (&identifier, &jacobian) in tape.identifiers().iter().zip(tape.jacobians()) {
            assert_relative_eq!(jacobian, 1.0 + 0.1 * f64::from(identifier).sin());
            assert!((0.9..=1.1).contains(&jacobian));
        }
    }

    #[test]
    fn test_generate_invalid_range() {
        let err = Tape::generate(10, 80, 20, 42).unwrap_err();
        assert_eq!(err, TapeError::InvalidRange { i_min: 80, i_max: 20 });
    }

    #[test]
    fn test_generate_zero_size() {
        assert_eq!(Tape::generate(0, 1, 10, 42).unwrap_err(), TapeError::EmptyTape);
    }

    #[test]
    fn test_from_parts_length_mismatch() {
        let err = Tape::from_parts(vec![1, 2], vec![1.0]).unwrap_err();
        assert_eq!(
            err,
            TapeError::LengthMismatch {
                identifiers: 2,
                jacobians: 1
            }
        );
    }

    #[test]
    fn test_evaluate_matches_jacobian_product() {
        let tape = Tape::generate(50, 1, 100, 42).unwrap();
        let mut adjoints = TemporaryVector::new();
        adjoints.resize(tape.max_identifier() as usize + 1);

        let result = tape.evaluate(&mut adjoints, 3.0);
        assert_relative_eq!(result, 3.0 * tape.jacobian_product(), max_relative = 1e-12);
    }

    #[test]
    fn test_evaluate_self_loop() {
        // Consecutive repeated identifiers exercise the read-before-zero
        // ordering; a naive zero-then-read would lose the adjoint.
        let tape = Tape::from_parts(vec![3, 3, 3, 5, 5], vec![2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let mut adjoints = TemporaryVector::new();
        adjoints.resize(tape.max_identifier() as usize + 1);

        let result = tape.evaluate(&mut adjoints, 1.0);
        assert_relative_eq!(result, 2.0 * 3.0 * 4.0 * 5.0 * 6.0, max_relative = 1e-12);
    }

    #[test]
    fn test_evaluate_single_step() {
        let tape = Tape::from_parts(vec![4], vec![1.5]).unwrap();
        let mut adjoints = TemporaryVector::new();
        adjoints.resize(5);

        assert_relative_eq!(tape.evaluate(&mut adjoints, 2.0), 3.0);
        // The single touched location is drained.
        assert_eq!(adjoints.read(4), 0.0);
    }

    #[test]
    fn test_evaluate_drains_storage() {
        let tape = Tape::generate(100, 1, 30, 9).unwrap();
        let mut adjoints = TemporaryVector::new();
        adjoints.resize(tape.max_identifier() as usize + 1);

        let first = tape.evaluate(&mut adjoints, 1.0);
        for identifier in tape.identifiers() {
            assert_eq!(adjoints.read(*identifier), 0.0);
        }

        // Reuse without clearing; the self-healing property guarantees the
        // second evaluation sees a pristine storage.
        let second = tape.evaluate(&mut adjoints, 1.0);
        assert_relative_eq!(first, second, max_relative = 1e-12);
    }

    #[test]
    fn test_remap_dense_first_occurrence_order() {
        let mut tape =
            Tape::from_parts(vec![42, 7, 42, 99, 7], vec![1.0, 1.1, 0.9, 1.05, 0.95]).unwrap();
        tape.remap_identifiers(RemapKind::Ordered);
        assert_eq!(tape.identifiers(), &[1, 2, 1, 3, 2]);
        assert!(tape.is_remapped());
    }

    #[test]
    fn test_remap_kinds_agree() {
        let mut ordered = Tape::generate(200, 1, 50, 13).unwrap();
        let mut unordered = ordered.clone();
        ordered.remap_identifiers(RemapKind::Ordered);
        unordered.remap_identifiers(RemapKind::Unordered);
        assert_eq!(ordered.identifiers(), unordered.identifiers());
    }

    #[test]
    fn test_remap_idempotent() {
        let mut tape = Tape::generate(200, 1, 50, 13).unwrap();
        tape.remap_identifiers(RemapKind::Unordered);
        let once = tape.identifiers().to_vec();
        tape.remap_identifiers(RemapKind::Unordered);
        assert_eq!(tape.identifiers(), &once[..]);
    }

    #[test]
    fn test_remap_preserves_result() {
        let mut tape = Tape::generate(100, 500, 900, 21).unwrap();
        let mut adjoints = TemporaryVector::new();
        adjoints.resize(tape.max_identifier() as usize + 1);
        let before = tape.evaluate(&mut adjoints, 1.0);

        tape.remap_identifiers(RemapKind::Ordered);
        let distinct = tape.max_identifier();
        assert!(distinct as usize <= tape.len());
        assert_eq!(tape.min_identifier(), 1);

        let mut dense = TemporaryVector::new();
        dense.resize(distinct as usize + 1);
        let after = tape.evaluate(&mut dense, 1.0);
        assert_relative_eq!(before, after, max_relative = 1e-12);
    }

    #[test]
    fn test_display_one_row_per_step() {
        let tape = Tape::from_parts(vec![1, 2], vec![1.0, 0.9]).unwrap();
        let rendered = format!("{}", tape);
        assert_eq!(rendered.lines().count(), 2);
    }
}
