//! Commands reading and resetting the persisted queue.

use crate::cli::args::{KeyArgs, OutputFormat};
use crate::config::Config;
use crate::error::LinkError;
use crate::link::Snapshot;
use crate::output::{format_snapshot, format_status, to_json, QueueStatus};
use crate::storage::{SqliteStorage, StorageProvider};

fn resolve_key(config: &Config, args: &KeyArgs) -> String {
    args.key
        .clone()
        .unwrap_or_else(|| config.link.store_key.clone())
}

/// Read the snapshot under `key`; a missing key reads as empty.
fn load_snapshot(storage: &dyn StorageProvider, key: &str) -> Result<Snapshot, LinkError> {
    match storage.get_item(key)? {
        Some(text) => Snapshot::from_json(&text),
        None => Ok(Snapshot::default()),
    }
}

/// Execute status command
///
/// # Errors
///
/// Returns an error if the store cannot be read or holds an invalid snapshot.
pub fn status(
    storage: &SqliteStorage,
    config: &Config,
    args: &KeyArgs,
    format: OutputFormat,
) -> Result<String, LinkError> {
    let key = resolve_key(config, args);
    let snapshot = load_snapshot(storage, &key)?;
    let status = QueueStatus::new(&key, &snapshot, storage.updated_at(&key)?);
    format_status(&status, format)
}

/// Execute show command
///
/// # Errors
///
/// Returns an error if the store cannot be read or holds an invalid snapshot.
pub fn show(
    storage: &SqliteStorage,
    config: &Config,
    args: &KeyArgs,
    limit: usize,
    format: OutputFormat,
) -> Result<String, LinkError> {
    let key = resolve_key(config, args);
    let snapshot = load_snapshot(storage, &key)?;
    format_snapshot(&key, &snapshot, limit, format)
}

/// Execute clear command
///
/// # Errors
///
/// Returns an error without `--force`, or if the write fails.
pub fn clear(
    storage: &SqliteStorage,
    config: &Config,
    args: &KeyArgs,
    force: bool,
    format: OutputFormat,
) -> Result<String, LinkError> {
    if !force {
        return Err(LinkError::Config(
            "Use --force to discard the persisted queue".to_string(),
        ));
    }

    let key = resolve_key(config, args);
    let discarded = load_snapshot(storage, &key).map_or(0, |s| s.len());
    storage.set_item(&key, &Snapshot::default().to_json()?)?;
    tracing::info!(store_key = %key, discarded, "cleared persisted queue");

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "store_key": key,
            "discarded": discarded,
        })),
        OutputFormat::Pretty => Ok(format!(
            "Cleared {discarded} persisted operation(s) under {key}"
        )),
    }
}

/// Execute keys command
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn keys(storage: &SqliteStorage, format: OutputFormat) -> Result<String, LinkError> {
    let keys = storage.keys()?;

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "count": keys.len(),
            "items": keys,
        })),
        OutputFormat::Pretty => {
            if keys.is_empty() {
                Ok("Store is empty.".to_string())
            } else {
                Ok(keys.join("\n"))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn storage() -> SqliteStorage {
        SqliteStorage::with_database(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_status_of_missing_key() {
        let out = status(&storage(), &Config::default(), &KeyArgs::default(), OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["entries"], 0);
        assert_eq!(value["store_key"], "@offlineQueueKey");
        assert!(value["updated_at"].is_null());
    }

    #[test]
    fn test_show_reads_key_override() {
        let storage = storage();
        storage
            .set_item("@other", r#"[{"mutation":"mutation A { a }","variables":{}}]"#)
            .unwrap();
        let args = KeyArgs {
            key: Some("@other".to_string()),
        };

        let out = show(&storage, &Config::default(), &args, 10, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["count"], 1);
    }

    #[test]
    fn test_clear_requires_force() {
        let err = clear(
            &storage(),
            &Config::default(),
            &KeyArgs::default(),
            false,
            OutputFormat::Pretty,
        )
        .unwrap_err();
        assert!(matches!(err, LinkError::Config(_)));
    }

    #[test]
    fn test_clear_writes_empty_snapshot() {
        let storage = storage();
        storage
            .set_item("@offlineQueueKey", r#"[{"query":"{ a }","variables":{}}]"#)
            .unwrap();

        let out = clear(
            &storage,
            &Config::default(),
            &KeyArgs::default(),
            true,
            OutputFormat::Pretty,
        )
        .unwrap();

        assert!(out.contains("Cleared 1"));
        assert_eq!(
            storage.get_item("@offlineQueueKey").unwrap(),
            Some("[]".to_string())
        );
    }

    #[test]
    fn test_invalid_snapshot_is_an_error() {
        let storage = storage();
        storage.set_item("@offlineQueueKey", "{oops").unwrap();

        let err = show(&storage, &Config::default(), &KeyArgs::default(), 10, OutputFormat::Pretty)
            .unwrap_err();
        assert!(matches!(err, LinkError::Parse(_)));
    }
}
