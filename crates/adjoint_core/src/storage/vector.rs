//! Vector-backed adjoint storage.
//!
//! Direct indexing by identifier into a contiguous buffer. The temporary
//! variant owns a fresh buffer per evaluation; the persistent variants
//! borrow a buffer owned by the executing worker for the whole run and
//! rely on the tape's auto-zeroing to keep it clean between evaluations.

use super::AdjointStore;
use crate::tape::Identifier;

/// Adjoint storage backed by a freshly allocated vector.
///
/// Sized to `max_identifier + 1` before each evaluation and dropped
/// afterwards.
#[derive(Clone, Debug, Default)]
pub struct TemporaryVector {
    values: Vec<f64>,
}

impl TemporaryVector {
    /// Creates an empty storage; call [`AdjointStore::resize`] before use.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdjointStore for TemporaryVector {
    #[inline]
    fn read(&self, identifier: Identifier) -> f64 {
        self.values[identifier as usize]
    }

    #[inline]
    fn write(&mut self, identifier: Identifier, value: f64) {
        self.values[identifier as usize] = value;
    }

    fn resize(&mut self, len: usize) {
        self.values.resize(len, 0.0);
    }

    fn clear(&mut self) {
        self.values = Vec::new();
    }
}

/// Adjoint storage borrowing a worker-owned persistent buffer.
///
/// The buffer outlives individual evaluations and tapes: it is sized to
/// the largest identifier the worker has seen and only released at
/// strategy teardown. It must never be shared between workers; concurrent
/// access from two workers would corrupt unrelated tapes' adjoints.
#[derive(Debug)]
pub struct PersistentVector<'a> {
    values: &'a mut Vec<f64>,
}

impl<'a> PersistentVector<'a> {
    /// Wraps the worker's persistent buffer.
    pub fn new(buffer: &'a mut Vec<f64>) -> Self {
        Self { values: buffer }
    }
}

impl AdjointStore for PersistentVector<'_> {
    #[inline]
    fn read(&self, identifier: Identifier) -> f64 {
        self.values[identifier as usize]
    }

    #[inline]
    fn write(&mut self, identifier: Identifier, value: f64) {
        self.values[identifier as usize] = value;
    }

    fn resize(&mut self, len: usize) {
        // Stale entries from earlier tapes are zeros thanks to the
        // auto-zeroing evaluation contract, so growing with 0.0 keeps the
        // whole buffer pristine.
        self.values.resize(len, 0.0);
    }

    fn clear(&mut self) {
        *self.values = Vec::new();
    }
}

/// Adjoint storage borrowing a worker-owned persistent buffer, addressed
/// with an offset.
///
/// Slot `identifier - offset` holds the adjoint of `identifier`, where
/// `offset` is the tape's minimum identifier. The buffer then only needs
/// `max - min + 1` slots instead of `max + 1`.
#[derive(Debug)]
pub struct PersistentVectorOffset<'a> {
    values: &'a mut Vec<f64>,
    offset: Identifier,
}

impl<'a> PersistentVectorOffset<'a> {
    /// Wraps the worker's persistent buffer with the given base offset.
    pub fn new(buffer: &'a mut Vec<f64>, offset: Identifier) -> Self {
        Self {
            values: buffer,
            offset,
        }
    }
}

impl AdjointStore for PersistentVectorOffset<'_> {
    #[inline]
    fn read(&self, identifier: Identifier) -> f64 {
        self.values[(identifier - self.offset) as usize]
    }

    #[inline]
    fn write(&mut self, identifier: Identifier, value: f64) {
        self.values[(identifier - self.offset) as usize] = value;
    }

    fn resize(&mut self, len: usize) {
        self.values.resize(len, 0.0);
    }

    fn clear(&mut self) {
        *self.values = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_vector_defaults_to_zero() {
        let mut storage = TemporaryVector::new();
        storage.resize(10);
        assert_eq!(storage.read(0), 0.0);
        assert_eq!(storage.read(9), 0.0);
    }

    #[test]
    fn test_temporary_vector_read_write() {
        let mut storage = TemporaryVector::new();
        storage.resize(4);
        storage.write(3, 2.5);
        assert_eq!(storage.read(3), 2.5);
        storage.write(3, 0.0);
        assert_eq!(storage.read(3), 0.0);
    }

    #[test]
    #[should_panic]
    fn test_temporary_vector_out_of_capacity_panics() {
        let mut storage = TemporaryVector::new();
        storage.resize(4);
        storage.read(4);
    }

    #[test]
    fn test_persistent_vector_reuses_buffer() {
        let mut buffer = Vec::new();
        {
            let mut storage = PersistentVector::new(&mut buffer);
            storage.resize(8);
            storage.write(5, 1.5);
            storage.write(5, 0.0);
        }
        // Buffer survives the storage instance and stays zeroed.
        assert_eq!(buffer.len(), 8);
        assert!(buffer.iter().all(|&v| v == 0.0));

        let mut storage = PersistentVector::new(&mut buffer);
        storage.resize(16);
        assert_eq!(storage.read(15), 0.0);
    }

    #[test]
    fn test_persistent_vector_clear_releases() {
        let mut buffer = vec![0.0; 1024];
        let mut storage = PersistentVector::new(&mut buffer);
        storage.clear();
        assert_eq!(buffer.capacity(), 0);
    }

    #[test]
    fn test_offset_addressing() {
        let mut buffer = Vec::new();
        let mut storage = PersistentVectorOffset::new(&mut buffer, 500);
        storage.resize(3);
        storage.write(500, 1.0);
        storage.write(502, 2.0);
        assert_eq!(storage.read(500), 1.0);
        assert_eq!(storage.read(502), 2.0);
        drop(storage);
        // Physical slots are relative to the offset.
        assert_eq!(buffer[0], 1.0);
        assert_eq!(buffer[2], 2.0);
    }
}
