use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Configuration '{0}' already exists")]
    AlreadyExists(String),

    #[error("Configuration '{0}' not found")]
    NotFound(String),

    #[error("Version {version} not found for configuration '{name}'")]
    VersionNotFound { name: String, version: i64 },

    /// A read observed state that the versioning invariants rule out.
    #[error("Storage inconsistency: {0}")]
    Inconsistent(String),

    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage is closed")]
    Closed,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage task failed: {0}")]
    Internal(String),
}
