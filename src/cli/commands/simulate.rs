//! Simulate command implementation.

use std::path::Path;
use std::rc::Rc;

use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::error::LinkError;
use crate::features::simulate::{run_script, Script};
use crate::output::format_report;
use crate::storage::{MemoryStorage, StorageProvider};

/// Execute simulate command
///
/// Runs the script against `storage`, or against a throwaway in-memory store
/// when `storage` is `None`.
///
/// # Errors
///
/// Returns an error if the script cannot be loaded or a step fails.
pub fn simulate(
    storage: Option<Rc<dyn StorageProvider>>,
    config: &Config,
    script: &Path,
    format: OutputFormat,
) -> Result<String, LinkError> {
    let script = Script::load(script)?;
    let storage = storage.unwrap_or_else(|| Rc::new(MemoryStorage::new()));

    let report = run_script(&script, config.link_options(storage))?;
    format_report(&report, format)
}
