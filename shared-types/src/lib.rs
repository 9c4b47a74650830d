use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated configuration payload.
///
/// This is the only shape the store accepts: both fields are required and
/// nothing else may appear alongside them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigData {
    pub max_limit: u64,
    pub enabled: bool,
}

impl ConfigData {
    pub fn new(max_limit: u64, enabled: bool) -> Self {
        Self { max_limit, enabled }
    }
}

impl fmt::Display for ConfigData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "max_limit={} enabled={}", self.max_limit, self.enabled)
    }
}

/// Payload of a configuration read, for the latest or a specific version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationData {
    pub name: String,
    pub version: i64,
    pub data: ConfigData,
    pub created_at: DateTime<Utc>,
}

/// Returned by `POST /configs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationCreated {
    pub name: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// Returned by `PUT /configs/{name}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationUpdated {
    pub name: String,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

/// Returned by `POST /configs/{name}/rollback`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationRollback {
    pub name: String,
    pub new_version: i64,
    pub target_version: i64,
    pub rolled_back_at: DateTime<Utc>,
}

/// Version information for a configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// Version history of a configuration, newest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionList {
    pub name: String,
    pub current_version: i64,
    pub versions: Vec<VersionInfo>,
}

/// A single schema constraint violated by a payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// JSON pointer to the offending value, `/` for the document root
    pub field: String,
    pub error: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error)
    }
}

/// Envelope for every successful response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// Envelope for every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details,
            },
        }
    }
}
