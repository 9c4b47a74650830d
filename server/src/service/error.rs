use thiserror::Error;

use super::validation::ValidationError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Version number must be a positive integer, got {0}")]
    InvalidVersionNumber(i64),

    /// A stored payload no longer parses into the configuration shape.
    #[error("Stored payload of '{name}' version {version} is unreadable: {reason}")]
    CorruptPayload {
        name: String,
        version: i64,
        reason: String,
    },
}

pub type ServiceResult<T> = Result<T, ServiceError>;
