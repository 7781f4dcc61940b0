//! Error types for offline-link.

use thiserror::Error;

/// Errors produced by the offline queue, its storage, and the CLI.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The link was constructed without a storage collaborator.
    #[error("Storage must be provided (a SQLite or in-memory store) but was not set")]
    MissingStorage,

    /// A storage read or write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The SQLite layer failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Invalid configuration or misuse of an API.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A query document could not be classified.
    #[error("Invalid document: {0}")]
    Document(String),

    /// The transport failed to execute a forwarded operation.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A requested item does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON serialization or parsing failed.
    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    /// YAML serialization or parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Filesystem access failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
