use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata row, one per configuration name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    pub current_version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable snapshot of a configuration payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: i64,
    pub configuration_name: String,
    pub version_number: i64,
    /// Payload exactly as it was accepted; never rewritten.
    pub json_data: String,
    pub created_at: DateTime<Utc>,
}

impl Configuration {
    /// Version number the next mutation must write.
    pub fn next_version_number(&self) -> i64 {
        self.current_version + 1
    }
}
