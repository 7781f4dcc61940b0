//! `SQLite` database connection and the storage provider built on it.
//!
//! The database lives at `~/.offline-link/offline-link.db` and holds a single
//! key/value table that persisted snapshots are written into.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{migrations, StorageProvider};
use crate::config::Paths;
use crate::error::LinkError;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open() -> Result<Self, LinkError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &std::path::Path) -> Result<Self, LinkError> {
        let conn = Connection::open(path).map_err(|e| {
            LinkError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;

        let db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, LinkError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            LinkError::Database(format!("Failed to open in-memory database: {e}"))
        })?;

        let db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    fn migrate(&self) -> Result<(), LinkError> {
        migrations::run(&self.conn)
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, LinkError> {
        migrations::get_version(&self.conn)
    }

    /// Get a reference to the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// A [`StorageProvider`] that upserts into the `kv_store` table.
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    /// Open the store at the default database location.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn new() -> Result<Self, LinkError> {
        Ok(Self::with_database(Database::open()?))
    }

    /// Wrap an existing database connection.
    #[must_use]
    pub const fn with_database(db: Database) -> Self {
        Self { db }
    }

    /// When `key` was last written, as RFC 3339.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn updated_at(&self, key: &str) -> Result<Option<String>, LinkError> {
        self.db
            .connection()
            .query_row(
                "SELECT updated_at FROM kv_store WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| LinkError::Database(format!("Failed to read timestamp for {key}: {e}")))
    }
}

impl StorageProvider for SqliteStorage {
    fn set_item(&self, key: &str, value: &str) -> Result<(), LinkError> {
        self.db
            .connection()
            .execute(
                r"INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                  ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                 updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|e| LinkError::Storage(format!("Failed to write {key}: {e}")))?;

        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, LinkError> {
        self.db
            .connection()
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| LinkError::Storage(format!("Failed to read {key}: {e}")))
    }

    fn keys(&self) -> Result<Vec<String>, LinkError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare("SELECT key FROM kv_store ORDER BY key ASC")
            .map_err(|e| LinkError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| LinkError::Database(format!("Failed to list keys: {e}")))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row.map_err(|e| LinkError::Database(e.to_string()))?);
        }

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.schema_version().unwrap() > 0);
    }

    #[test]
    fn test_open_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let db = Database::open_at(&db_path).unwrap();
        assert!(db.schema_version().unwrap() > 0);
        assert!(db_path.exists());
    }

    #[test]
    fn test_upsert_replaces_value() {
        let storage = SqliteStorage::with_database(Database::open_in_memory().unwrap());

        storage.set_item("@offlineQueueKey", "[1]").unwrap();
        storage.set_item("@offlineQueueKey", "[]").unwrap();

        assert_eq!(
            storage.get_item("@offlineQueueKey").unwrap(),
            Some("[]".to_string())
        );
        assert_eq!(storage.keys().unwrap(), vec!["@offlineQueueKey"]);
        assert!(storage.updated_at("@offlineQueueKey").unwrap().is_some());
    }

    #[test]
    fn test_get_missing_key() {
        let storage = SqliteStorage::with_database(Database::open_in_memory().unwrap());
        assert_eq!(storage.get_item("nope").unwrap(), None);
        assert!(storage.keys().unwrap().is_empty());
    }

    #[test]
    fn test_value_survives_reopen() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        {
            let storage = SqliteStorage::with_database(Database::open_at(&db_path).unwrap());
            storage.set_item("k", "v").unwrap();
        }

        let storage = SqliteStorage::with_database(Database::open_at(&db_path).unwrap());
        assert_eq!(storage.get_item("k").unwrap(), Some("v".to_string()));
    }
}
