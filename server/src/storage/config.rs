use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::StorageError;

pub const DEFAULT_DB_PATH: &str = "./data/config.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageConfig {
    /// SQLite database file, created on first open
    File { path: PathBuf, busy_timeout_ms: u64 },
    /// Private in-memory database that lives as long as the backend
    Memory,
}

impl StorageConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = lookup("STORAGE_BACKEND").unwrap_or_else(|| "sqlite".to_string());

        match backend.as_str() {
            "sqlite" => {
                let path = lookup("DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
                if path.trim().is_empty() {
                    return Err(StorageError::InvalidConfig(
                        "DB_PATH must not be empty".to_string(),
                    ));
                }
                let busy_timeout_ms = match lookup("DB_BUSY_TIMEOUT_MS") {
                    Some(raw) => raw.parse::<u64>().map_err(|_| {
                        StorageError::InvalidConfig(format!(
                            "DB_BUSY_TIMEOUT_MS must be a non-negative integer, got '{raw}'"
                        ))
                    })?,
                    None => DEFAULT_BUSY_TIMEOUT_MS,
                };

                Ok(Self::File {
                    path: PathBuf::from(path),
                    busy_timeout_ms,
                })
            }
            "memory" => Ok(Self::Memory),
            other => Err(StorageError::InvalidConfig(format!(
                "Unknown storage backend: {other}. Must be 'sqlite' or 'memory'"
            ))),
        }
    }
}
