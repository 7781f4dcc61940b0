//! Configuration settings for the offline-link CLI.
//!
//! Settings are loaded from `~/.offline-link/config.yaml`.

use std::path::PathBuf;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::options::{LinkOptions, DEFAULT_STORE_KEY};
use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::LinkError;
use crate::storage::StorageProvider;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Offline queue settings.
    pub link: LinkConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Output settings.
    pub output: OutputConfig,
}

/// Offline queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Key the persisted snapshot is written under.
    #[serde(default = "default_store_key")]
    pub store_key: String,
    /// Whether the gate starts open.
    #[serde(default = "default_true")]
    pub start_open: bool,
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Override for the SQLite database path.
    pub database: Option<PathBuf>,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Format used when `--output` is not given.
    pub default_format: OutputFormat,
}

fn default_store_key() -> String {
    DEFAULT_STORE_KEY.to_string()
}

const fn default_true() -> bool {
    true
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            store_key: default_store_key(),
            start_open: default_true(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, LinkError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, LinkError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            LinkError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            LinkError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), LinkError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| LinkError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            LinkError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Resolve the SQLite database path, honoring the override.
    #[must_use]
    pub fn database_path(&self, paths: &Paths) -> PathBuf {
        self.storage
            .database
            .clone()
            .unwrap_or_else(|| paths.database.clone())
    }

    /// Build link options from this configuration.
    #[must_use]
    pub fn link_options(&self, storage: Rc<dyn StorageProvider>) -> LinkOptions {
        LinkOptions::new()
            .with_storage(storage)
            .with_store_key(self.link.store_key.clone())
            .with_open(self.link.start_open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.link.store_key, "@offlineQueueKey");
        assert!(config.link.start_open);
        assert!(config.storage.database.is_none());
        assert_eq!(config.output.default_format, OutputFormat::Pretty);
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let config = Config::load_from_path(&config_path).unwrap();
        assert_eq!(config.link.store_key, DEFAULT_STORE_KEY);
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut config = Config::default();
        config.link.store_key = "@myApp".to_string();
        config.link.start_open = false;
        config.save_to_path(&config_path).unwrap();

        let loaded = Config::load_from_path(&config_path).unwrap();
        assert_eq!(loaded.link.store_key, "@myApp");
        assert!(!loaded.link.start_open);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let partial_yaml = r"
link:
  start_open: false
";
        std::fs::write(&config_path, partial_yaml).unwrap();

        let config = Config::load_from_path(&config_path).unwrap();
        assert!(!config.link.start_open);
        assert_eq!(config.link.store_key, DEFAULT_STORE_KEY);
    }

    #[test]
    fn test_malformed_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        std::fs::write(&config_path, "link: [unclosed").unwrap();

        let err = Config::load_from_path(&config_path).unwrap_err();
        assert!(matches!(err, LinkError::Config(_)));
    }

    #[test]
    fn test_database_path_override() {
        let paths = Paths::with_root(PathBuf::from("/tmp/root"));
        let mut config = Config::default();
        assert_eq!(config.database_path(&paths), paths.database);

        config.storage.database = Some(PathBuf::from("/tmp/other.db"));
        assert_eq!(config.database_path(&paths), PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn test_link_options() {
        let mut config = Config::default();
        config.link.start_open = false;

        let options = config.link_options(Rc::new(MemoryStorage::new()));
        assert!(options.storage.is_some());
        assert!(!options.is_open);
        assert_eq!(options.store_key, DEFAULT_STORE_KEY);
    }
}
