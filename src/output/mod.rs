//! Output formatting for offline-link.
//!
//! Pretty output uses `colored`; JSON output is pretty-printed `serde_json`.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::LinkError;
use crate::features::simulate::SimulationReport;
use crate::link::Snapshot;

pub use json::*;
pub use pretty::*;

/// Summary of a persisted queue.
#[derive(Debug, Clone, serde::Serialize)]
pub struct QueueStatus {
    pub store_key: String,
    pub entries: usize,
    pub mutations: usize,
    pub queries: usize,
    pub updated_at: Option<String>,
}

impl QueueStatus {
    /// Summarize a snapshot read from `store_key`.
    #[must_use]
    pub fn new(store_key: &str, snapshot: &Snapshot, updated_at: Option<String>) -> Self {
        Self {
            store_key: store_key.to_string(),
            entries: snapshot.len(),
            mutations: snapshot.mutations(),
            queries: snapshot.queries(),
            updated_at,
        }
    }
}

/// Format queue status.
///
/// # Errors
///
/// Returns `LinkError::Parse` if JSON serialization fails.
pub fn format_status(status: &QueueStatus, format: OutputFormat) -> Result<String, LinkError> {
    match format {
        OutputFormat::Pretty => Ok(format_status_pretty(status)),
        OutputFormat::Json => to_json(status),
    }
}

/// Format persisted entries.
///
/// # Errors
///
/// Returns `LinkError::Parse` if JSON serialization fails.
pub fn format_snapshot(
    store_key: &str,
    snapshot: &Snapshot,
    limit: usize,
    format: OutputFormat,
) -> Result<String, LinkError> {
    match format {
        OutputFormat::Pretty => Ok(format_snapshot_pretty(store_key, snapshot, limit)),
        OutputFormat::Json => format_snapshot_json(store_key, snapshot, limit),
    }
}

/// Format a simulation report.
///
/// # Errors
///
/// Returns `LinkError::Parse` if JSON serialization fails.
pub fn format_report(report: &SimulationReport, format: OutputFormat) -> Result<String, LinkError> {
    match format {
        OutputFormat::Pretty => Ok(format_report_pretty(report)),
        OutputFormat::Json => to_json(report),
    }
}
