//! Storage layer for offline-link.
//!
//! The offline queue writes its persisted snapshot through a
//! [`StorageProvider`]. Two providers ship with the crate:
//! - [`MemoryStorage`] for embedding and tests
//! - [`SqliteStorage`] backed by `~/.offline-link/offline-link.db`

mod database;
mod memory;
mod migrations;

pub use database::{Database, SqliteStorage};
pub use memory::MemoryStorage;

use crate::error::LinkError;

/// Key/value storage collaborator.
///
/// Writes are synchronous. Implementations provide no mutual exclusion, so
/// two links sharing one key overwrite each other.
#[cfg_attr(test, mockall::automock)]
pub trait StorageProvider {
    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), LinkError>;

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, LinkError>;

    /// List all keys currently stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn keys(&self) -> Result<Vec<String>, LinkError>;
}
