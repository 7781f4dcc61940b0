//! Configuration management for offline-link.
//!
//! Programmatic link options live in [`LinkOptions`]; the CLI additionally
//! reads `~/.offline-link/config.yaml`.

mod options;
mod paths;
mod settings;

pub use options::{LinkOptions, DEFAULT_STORE_KEY};
pub use paths::Paths;
pub use settings::{Config, LinkConfig, OutputConfig, StorageConfig};
