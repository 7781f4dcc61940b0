//! Construction options for [`OfflineQueueLink`](crate::link::OfflineQueueLink).

use std::fmt;
use std::rc::Rc;

use crate::storage::StorageProvider;

/// Storage key used when none is configured.
pub const DEFAULT_STORE_KEY: &str = "@offlineQueueKey";

/// Options for building an offline queue link.
///
/// `storage` is required; building a link from options without it fails.
#[derive(Clone)]
pub struct LinkOptions {
    /// Where the persisted snapshot is written.
    pub storage: Option<Rc<dyn StorageProvider>>,
    /// Key the snapshot is written under.
    pub store_key: String,
    /// Initial gate state.
    pub is_open: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            storage: None,
            store_key: DEFAULT_STORE_KEY.to_string(),
            is_open: true,
        }
    }
}

impl LinkOptions {
    /// Options with defaults and no storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the storage collaborator.
    #[must_use]
    pub fn with_storage(mut self, storage: Rc<dyn StorageProvider>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Set the storage key.
    #[must_use]
    pub fn with_store_key(mut self, store_key: impl Into<String>) -> Self {
        self.store_key = store_key.into();
        self
    }

    /// Set the initial gate state.
    #[must_use]
    pub const fn with_open(mut self, is_open: bool) -> Self {
        self.is_open = is_open;
        self
    }
}

impl fmt::Debug for LinkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkOptions")
            .field("storage", &self.storage.as_ref().map(|_| "<storage>"))
            .field("store_key", &self.store_key)
            .field("is_open", &self.is_open)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_defaults() {
        let options = LinkOptions::default();
        assert!(options.storage.is_none());
        assert_eq!(options.store_key, "@offlineQueueKey");
        assert!(options.is_open);
    }

    #[test]
    fn test_builder() {
        let options = LinkOptions::new()
            .with_storage(Rc::new(MemoryStorage::new()))
            .with_store_key("custom")
            .with_open(false);

        assert!(options.storage.is_some());
        assert_eq!(options.store_key, "custom");
        assert!(!options.is_open);
        assert!(format!("{options:?}").contains("<storage>"));
    }
}
