use async_trait::async_trait;

use super::error::StorageError;
use super::models::{Configuration, Version};

pub type StorageResult<T> = Result<T, StorageError>;

/// Transactional persistence for versioned configurations.
///
/// Every mutation appends exactly one version numbered `current_version + 1`
/// (or 1 on create) and advances `current_version` in the same transaction.
#[async_trait]
pub trait ConfigStorage: Send + Sync {
    async fn create_configuration(&self, name: &str, payload: &str)
    -> StorageResult<Configuration>;
    async fn update_configuration(&self, name: &str, payload: &str)
    -> StorageResult<Configuration>;
    /// Appends a copy of `target_version`'s payload as the new current version.
    async fn rollback_configuration(
        &self,
        name: &str,
        target_version: i64,
    ) -> StorageResult<Configuration>;
    async fn get_latest_configuration(&self, name: &str)
    -> StorageResult<(Configuration, Version)>;
    async fn get_configuration_version(
        &self,
        name: &str,
        version_number: i64,
    ) -> StorageResult<Version>;
    /// Returns the history newest first.
    async fn list_versions(&self, name: &str) -> StorageResult<(Configuration, Vec<Version>)>;
    async fn ping(&self) -> StorageResult<()>;
    async fn close(&self) -> StorageResult<()>;
}
