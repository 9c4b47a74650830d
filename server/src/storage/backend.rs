use async_trait::async_trait;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

use super::config::StorageConfig;
use super::error::StorageError;
use super::models::{Configuration, Version};
use super::queries;
use super::schema;
use super::traits::{ConfigStorage, StorageResult};

/// SQLite-backed version store.
///
/// Holds a single connection; `None` once the store has been closed.
pub struct SqliteBackend {
    connection: Arc<Mutex<Option<Connection>>>,
}

impl SqliteBackend {
    pub fn from_config(config: StorageConfig) -> StorageResult<Self> {
        let mut connection = match config {
            StorageConfig::File {
                path,
                busy_timeout_ms,
            } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                info!("Opening SQLite database at {}", path.display());
                let connection = Connection::open(&path)?;
                connection.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
                connection.execute_batch("PRAGMA journal_mode = wal;")?;
                connection
            }
            StorageConfig::Memory => {
                info!("Opening in-memory SQLite database");
                Connection::open_in_memory()?
            }
        };

        connection.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::initialize_schema(&mut connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(Some(connection))),
        })
    }

    /// Runs `op` on the blocking pool with exclusive use of the connection.
    async fn with_connection<T, F>(&self, op: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Connection) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let mut guard = connection
                .lock()
                .map_err(|_| StorageError::Internal("connection lock poisoned".to_string()))?;
            let connection = guard.as_mut().ok_or(StorageError::Closed)?;
            op(connection)
        })
        .await
        .map_err(|err| StorageError::Internal(format!("blocking task failed: {err}")))?
    }
}

#[async_trait]
impl ConfigStorage for SqliteBackend {
    async fn create_configuration(
        &self,
        name: &str,
        payload: &str,
    ) -> StorageResult<Configuration> {
        let name = name.to_string();
        let payload = payload.to_string();
        self.with_connection(move |conn| queries::create_configuration(conn, &name, &payload))
            .await
    }

    async fn update_configuration(
        &self,
        name: &str,
        payload: &str,
    ) -> StorageResult<Configuration> {
        let name = name.to_string();
        let payload = payload.to_string();
        self.with_connection(move |conn| queries::update_configuration(conn, &name, &payload))
            .await
    }

    async fn rollback_configuration(
        &self,
        name: &str,
        target_version: i64,
    ) -> StorageResult<Configuration> {
        let name = name.to_string();
        self.with_connection(move |conn| {
            queries::rollback_configuration(conn, &name, target_version)
        })
        .await
    }

    async fn get_latest_configuration(
        &self,
        name: &str,
    ) -> StorageResult<(Configuration, Version)> {
        let name = name.to_string();
        self.with_connection(move |conn| queries::get_latest_configuration(conn, &name))
            .await
    }

    async fn get_configuration_version(
        &self,
        name: &str,
        version_number: i64,
    ) -> StorageResult<Version> {
        let name = name.to_string();
        self.with_connection(move |conn| {
            queries::get_configuration_version(conn, &name, version_number)
        })
        .await
    }

    async fn list_versions(&self, name: &str) -> StorageResult<(Configuration, Vec<Version>)> {
        let name = name.to_string();
        self.with_connection(move |conn| queries::list_versions(conn, &name))
            .await
    }

    async fn ping(&self) -> StorageResult<()> {
        self.with_connection(|conn| queries::ping(conn)).await
    }

    async fn close(&self) -> StorageResult<()> {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let mut guard = connection
                .lock()
                .map_err(|_| StorageError::Internal("connection lock poisoned".to_string()))?;
            match guard.take() {
                Some(conn) => match conn.close() {
                    Ok(()) => {
                        info!("SQLite database closed");
                        Ok(())
                    }
                    Err((conn, err)) => {
                        *guard = Some(conn);
                        Err(StorageError::Database(err))
                    }
                },
                None => Ok(()),
            }
        })
        .await
        .map_err(|err| StorageError::Internal(format!("blocking task failed: {err}")))?
    }
}
