//! Path resolution for offline-link configuration and data files.
//!
//! All data is stored in `~/.offline-link/`:
//! - `config.yaml` - CLI configuration
//! - `offline-link.db` - SQLite key/value store holding persisted snapshots

use std::path::PathBuf;

use crate::error::LinkError;

/// Paths to configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.offline-link/`
    pub root: PathBuf,
    /// Config file: `~/.offline-link/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.offline-link/offline-link.db`
    pub database: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, LinkError> {
        let home = std::env::var("HOME")
            .map_err(|_| LinkError::Config("Could not determine home directory".to_string()))?;

        Ok(Self::with_root(PathBuf::from(home).join(".offline-link")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("offline-link.db"),
            root,
        }
    }

    /// Ensure the root directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), LinkError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                LinkError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}
