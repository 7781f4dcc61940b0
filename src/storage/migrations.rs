//! Database migrations for offline-link.
//!
//! Each migration upgrades the schema by one version. Migrations run
//! automatically when the database is opened.

use rusqlite::Connection;

use crate::error::LinkError;

/// Current schema version.
const CURRENT_VERSION: i32 = 1;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, LinkError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| LinkError::Database(format!("Failed to get schema version: {e}")))
}

fn set_version(conn: &Connection, version: i32) -> Result<(), LinkError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| LinkError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), LinkError> {
    let current = get_version(conn)?;

    if current >= CURRENT_VERSION {
        return Ok(());
    }

    for version in (current + 1)..=CURRENT_VERSION {
        tracing::debug!(version, "applying storage migration");
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

fn run_migration(conn: &Connection, version: i32) -> Result<(), LinkError> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(LinkError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: key/value table holding persisted snapshots.
fn migrate_v1(conn: &Connection) -> Result<(), LinkError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| LinkError::Database(format!("Migration v1 failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_v1() {
        let conn = Connection::open_in_memory().unwrap();

        run(&conn).unwrap();
        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);

        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES ('k', '[]', '2024-01-01T10:00:00Z')",
            [],
        )
        .unwrap();
    }

    #[test]
    fn test_migration_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        run(&conn).unwrap();
        run(&conn).unwrap();

        assert_eq!(get_version(&conn).unwrap(), CURRENT_VERSION);
    }

    #[test]
    fn test_get_version_new_database() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_version(&conn).unwrap(), 0);
    }
}
