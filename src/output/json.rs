//! JSON output formatting.

use serde::Serialize;
use serde_json::json;

use crate::error::LinkError;
use crate::link::Snapshot;

/// Format persisted entries as JSON.
///
/// # Errors
///
/// Returns `LinkError::Parse` if JSON serialization fails.
pub fn format_snapshot_json(
    store_key: &str,
    snapshot: &Snapshot,
    limit: usize,
) -> Result<String, LinkError> {
    let items: Vec<_> = snapshot.entries().iter().take(limit).collect();
    let output = json!({
        "store_key": store_key,
        "count": snapshot.len(),
        "items": items
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `LinkError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, LinkError> {
    Ok(serde_json::to_string_pretty(value)?)
}
