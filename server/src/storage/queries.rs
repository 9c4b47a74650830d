//! Synchronous SQL for the version store.
//!
//! Every mutation runs in a `BEGIN IMMEDIATE` transaction and reads the
//! current version inside it, so the metadata update and the version insert
//! commit together and concurrent writers queue on the database write lock.

use chrono::{DateTime, Utc};
use rusqlite::{
    Connection, ErrorCode, OptionalExtension, Row, Transaction, TransactionBehavior, params,
};
use tracing::debug;

use super::error::StorageError;
use super::models::{Configuration, Version};

const SELECT_CONFIGURATION: &str = "
    SELECT name, current_version, created_at, updated_at
    FROM configurations
    WHERE name = ?1";

const SELECT_VERSION: &str = "
    SELECT id, configuration_name, version_number, json_data, created_at
    FROM versions
    WHERE configuration_name = ?1 AND version_number = ?2";

const SELECT_LATEST: &str = "
    SELECT c.name, c.current_version, c.created_at, c.updated_at,
           v.id, v.version_number, v.json_data, v.created_at
    FROM configurations c
    LEFT JOIN versions v
        ON v.configuration_name = c.name AND v.version_number = c.current_version
    WHERE c.name = ?1";

const SELECT_HISTORY: &str = "
    SELECT id, configuration_name, version_number, json_data, created_at
    FROM versions
    WHERE configuration_name = ?1
    ORDER BY version_number DESC";

const INSERT_VERSION: &str = "
    INSERT INTO versions (configuration_name, version_number, json_data, created_at)
    VALUES (?1, ?2, ?3, ?4)";

pub(super) fn create_configuration(
    connection: &mut Connection,
    name: &str,
    payload: &str,
) -> Result<Configuration, StorageError> {
    let tx = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let now = Utc::now();

    // The primary key decides uniqueness; no existence pre-check.
    let inserted = tx.execute(
        "INSERT INTO configurations (name, current_version, created_at, updated_at)
         VALUES (?1, 1, ?2, ?2)",
        params![name, now],
    );
    match inserted {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }
        Err(err) => return Err(err.into()),
    }

    insert_version(&tx, name, 1, payload, now)?;
    tx.commit()?;
    debug!(name, "created configuration at version 1");

    Ok(Configuration {
        name: name.to_string(),
        current_version: 1,
        created_at: now,
        updated_at: now,
    })
}

pub(super) fn update_configuration(
    connection: &mut Connection,
    name: &str,
    payload: &str,
) -> Result<Configuration, StorageError> {
    let tx = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current =
        load_configuration(&tx, name)?.ok_or_else(|| StorageError::NotFound(name.to_string()))?;

    let updated = append_version(&tx, &current, payload)?;
    tx.commit()?;
    debug!(name, version = updated.current_version, "appended version");

    Ok(updated)
}

pub(super) fn rollback_configuration(
    connection: &mut Connection,
    name: &str,
    target_version: i64,
) -> Result<Configuration, StorageError> {
    let tx = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let target = load_version(&tx, name, target_version)?.ok_or_else(|| {
        StorageError::VersionNotFound {
            name: name.to_string(),
            version: target_version,
        }
    })?;
    let current =
        load_configuration(&tx, name)?.ok_or_else(|| StorageError::NotFound(name.to_string()))?;

    // Copied verbatim: the target passed validation when it was first written.
    let updated = append_version(&tx, &current, &target.json_data)?;
    tx.commit()?;
    debug!(
        name,
        target_version,
        version = updated.current_version,
        "rolled back configuration"
    );

    Ok(updated)
}

pub(super) fn get_latest_configuration(
    connection: &Connection,
    name: &str,
) -> Result<(Configuration, Version), StorageError> {
    let row = connection
        .query_row(SELECT_LATEST, params![name], |row| {
            let configuration = configuration_from_row(row)?;
            let version_id: Option<i64> = row.get(4)?;
            let version = match version_id {
                Some(id) => Some(Version {
                    id,
                    configuration_name: configuration.name.clone(),
                    version_number: row.get(5)?,
                    json_data: row.get(6)?,
                    created_at: row.get(7)?,
                }),
                None => None,
            };
            Ok((configuration, version))
        })
        .optional()?;

    match row {
        None => Err(StorageError::NotFound(name.to_string())),
        Some((configuration, Some(version))) => Ok((configuration, version)),
        Some((configuration, None)) => Err(StorageError::Inconsistent(format!(
            "configuration '{}' points at missing version {}",
            configuration.name, configuration.current_version
        ))),
    }
}

pub(super) fn get_configuration_version(
    connection: &Connection,
    name: &str,
    version_number: i64,
) -> Result<Version, StorageError> {
    load_version(connection, name, version_number)?.ok_or_else(|| StorageError::VersionNotFound {
        name: name.to_string(),
        version: version_number,
    })
}

pub(super) fn list_versions(
    connection: &mut Connection,
    name: &str,
) -> Result<(Configuration, Vec<Version>), StorageError> {
    // One read transaction so the metadata and the history come from the same snapshot.
    let tx = connection.transaction()?;
    let configuration =
        load_configuration(&tx, name)?.ok_or_else(|| StorageError::NotFound(name.to_string()))?;

    let mut stmt = tx.prepare(SELECT_HISTORY)?;
    let versions = stmt
        .query_map(params![name], version_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);
    tx.commit()?;

    Ok((configuration, versions))
}

pub(super) fn ping(connection: &Connection) -> Result<(), StorageError> {
    connection.query_row("SELECT 1", params![], |row| row.get::<_, i64>(0))?;
    Ok(())
}

/// Writes `current_version + 1` and advances the metadata row to it.
fn append_version(
    tx: &Transaction<'_>,
    current: &Configuration,
    payload: &str,
) -> Result<Configuration, StorageError> {
    let next = current.next_version_number();
    let now = Utc::now();

    insert_version(tx, &current.name, next, payload, now)?;
    let changed = tx.execute(
        "UPDATE configurations SET current_version = ?1, updated_at = ?2
         WHERE name = ?3 AND current_version = ?4",
        params![next, now, current.name, current.current_version],
    )?;
    if changed != 1 {
        return Err(StorageError::NotFound(current.name.clone()));
    }

    Ok(Configuration {
        current_version: next,
        updated_at: now,
        ..current.clone()
    })
}

fn insert_version(
    tx: &Transaction<'_>,
    name: &str,
    version_number: i64,
    payload: &str,
    created_at: DateTime<Utc>,
) -> Result<(), StorageError> {
    tx.execute(
        INSERT_VERSION,
        params![name, version_number, payload, created_at],
    )?;
    Ok(())
}

fn load_configuration(
    connection: &Connection,
    name: &str,
) -> Result<Option<Configuration>, StorageError> {
    Ok(connection
        .query_row(SELECT_CONFIGURATION, params![name], configuration_from_row)
        .optional()?)
}

fn load_version(
    connection: &Connection,
    name: &str,
    version_number: i64,
) -> Result<Option<Version>, StorageError> {
    Ok(connection
        .query_row(SELECT_VERSION, params![name, version_number], version_from_row)
        .optional()?)
}

fn configuration_from_row(row: &Row<'_>) -> rusqlite::Result<Configuration> {
    Ok(Configuration {
        name: row.get(0)?,
        current_version: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

fn version_from_row(row: &Row<'_>) -> rusqlite::Result<Version> {
    Ok(Version {
        id: row.get(0)?,
        configuration_name: row.get(1)?,
        version_number: row.get(2)?,
        json_data: row.get(3)?,
        created_at: row.get(4)?,
    })
}
