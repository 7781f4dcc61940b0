//! In-memory storage provider.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::StorageProvider;
use crate::error::LinkError;

/// A [`StorageProvider`] that keeps everything in a map.
///
/// Useful when the persisted snapshot is consumed in-process, and in tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
    writes: RefCell<usize>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set_item` calls received so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }
}

impl StorageProvider for MemoryStorage {
    fn set_item(&self, key: &str, value: &str) -> Result<(), LinkError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, LinkError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn keys(&self) -> Result<Vec<String>, LinkError> {
        Ok(self.items.borrow().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let storage = MemoryStorage::new();
        storage.set_item("a", "1").unwrap();
        storage.set_item("a", "2").unwrap();

        assert_eq!(storage.get_item("a").unwrap(), Some("2".to_string()));
        assert_eq!(storage.get_item("missing").unwrap(), None);
        assert_eq!(storage.write_count(), 2);
    }

    #[test]
    fn test_keys_sorted() {
        let storage = MemoryStorage::new();
        storage.set_item("b", "").unwrap();
        storage.set_item("a", "").unwrap();

        assert_eq!(storage.keys().unwrap(), vec!["a", "b"]);
    }
}
