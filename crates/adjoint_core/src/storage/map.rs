//! Map-backed adjoint storage.
//!
//! Built fresh per evaluation and keyed directly by identifier, so no
//! sizing step is needed regardless of how sparse the identifier range is.

use std::collections::{BTreeMap, HashMap};

use super::AdjointStore;
use crate::tape::Identifier;

/// Adjoint storage backed by a key-ordered map.
#[derive(Clone, Debug, Default)]
pub struct TemporaryMapOrdered {
    values: BTreeMap<Identifier, f64>,
}

impl TemporaryMapOrdered {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdjointStore for TemporaryMapOrdered {
    fn read(&self, identifier: Identifier) -> f64 {
        self.values.get(&identifier).copied().unwrap_or(0.0)
    }

    fn write(&mut self, identifier: Identifier, value: f64) {
        self.values.insert(identifier, value);
    }

    fn resize(&mut self, _len: usize) {}

    fn clear(&mut self) {
        self.values.clear();
    }
}

/// Adjoint storage backed by a hash map.
#[derive(Clone, Debug, Default)]
pub struct TemporaryMapUnordered {
    values: HashMap<Identifier, f64>,
}

impl TemporaryMapUnordered {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AdjointStore for TemporaryMapUnordered {
    fn read(&self, identifier: Identifier) -> f64 {
        self.values.get(&identifier).copied().unwrap_or(0.0)
    }

    fn write(&mut self, identifier: Identifier, value: f64) {
        self.values.insert(identifier, value);
    }

    fn resize(&mut self, _len: usize) {}

    fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_keys_read_zero() {
        let ordered = TemporaryMapOrdered::new();
        let unordered = TemporaryMapUnordered::new();
        assert_eq!(ordered.read(12345), 0.0);
        assert_eq!(unordered.read(12345), 0.0);
    }

    #[test]
    fn test_resize_is_noop() {
        let mut storage = TemporaryMapOrdered::new();
        storage.resize(0);
        storage.write(1_000_000, 2.0);
        assert_eq!(storage.read(1_000_000), 2.0);
    }

    #[test]
    fn test_write_overwrites() {
        let mut storage = TemporaryMapUnordered::new();
        storage.write(7, 1.5);
        storage.write(7, 0.0);
        assert_eq!(storage.read(7), 0.0);
    }

    #[test]
    fn test_clear_empties() {
        let mut storage = TemporaryMapOrdered::new();
        storage.write(3, 4.0);
        storage.clear();
        assert_eq!(storage.read(3), 0.0);
    }
}
