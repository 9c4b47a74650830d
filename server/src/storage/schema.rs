use rusqlite::{Connection, OptionalExtension, params};

use super::error::StorageError;

/// Schema version written to `store_meta` on a fresh database.
pub const SCHEMA_VERSION: i64 = 1;

const CREATE_TABLES: &str = "
    CREATE TABLE IF NOT EXISTS configurations (
        name TEXT PRIMARY KEY NOT NULL,
        current_version INTEGER NOT NULL CHECK (current_version > 0),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS versions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        configuration_name TEXT NOT NULL
            REFERENCES configurations(name) ON DELETE CASCADE,
        version_number INTEGER NOT NULL CHECK (version_number > 0),
        json_data TEXT NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (configuration_name, version_number)
    );
    CREATE INDEX IF NOT EXISTS idx_versions_configuration_name
        ON versions (configuration_name);
    CREATE TRIGGER IF NOT EXISTS versions_are_immutable
        BEFORE UPDATE ON versions
    BEGIN
        SELECT RAISE(ABORT, 'versions are immutable');
    END;
";

/// Creates the tables on a fresh database or checks the stored schema version.
pub fn initialize_schema(connection: &mut Connection) -> Result<(), StorageError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| {
            row.get(0)
        })
        .optional()?;

    match version {
        None => {
            tx.execute(
                "INSERT INTO store_meta (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;
            tx.execute_batch(CREATE_TABLES)?;
        }
        Some(SCHEMA_VERSION) => {}
        Some(other) => {
            return Err(StorageError::Inconsistent(format!(
                "unsupported schema version {other} (expected {SCHEMA_VERSION})"
            )));
        }
    }

    tx.commit()?;
    Ok(())
}
