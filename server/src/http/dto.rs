use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use shared_types::{ConfigurationCreated, ConfigurationRollback, ConfigurationUpdated};

use crate::storage::Configuration;

/// Request body for `POST /configs`
///
/// `data` is kept as raw JSON text so the stored payload is byte-for-byte
/// what the client sent.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateConfigRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

/// Request body for `PUT /configs/{name}`
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateConfigRequest {
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

/// Request body for `POST /configs/{name}/rollback`
#[derive(Debug, Serialize, Deserialize)]
pub struct RollbackConfigRequest {
    #[serde(default)]
    pub target_version: Option<i64>,
}

// Conversion helpers
pub fn created_response(config: Configuration) -> ConfigurationCreated {
    ConfigurationCreated {
        name: config.name,
        version: config.current_version,
        created_at: config.created_at,
    }
}

pub fn updated_response(config: Configuration) -> ConfigurationUpdated {
    ConfigurationUpdated {
        name: config.name,
        version: config.current_version,
        updated_at: config.updated_at,
    }
}

pub fn rollback_response(config: Configuration, target_version: i64) -> ConfigurationRollback {
    ConfigurationRollback {
        name: config.name,
        new_version: config.current_version,
        target_version,
        rolled_back_at: config.updated_at,
    }
}
