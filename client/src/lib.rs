use anyhow::Result;
use reqwest::{Client as ReqwestClient, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared_types::{
    ConfigData, ConfigurationCreated, ConfigurationData, ConfigurationRollback,
    ConfigurationUpdated, ErrorResponse, SuccessResponse, VersionList,
};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Error envelope returned by the server for a non-2xx response
#[derive(Debug, Clone, Error)]
#[error("{status} {code}: {message}")]
pub struct RemoteError {
    pub status: u16,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }
}

/// Client for interacting with the versioned config service
pub struct ConfigClient {
    client: ReqwestClient,
    base_url: String,
}

impl ConfigClient {
    /// Create a new client instance
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a configuration; the server assigns version 1
    pub async fn create_config(
        &self,
        name: &str,
        data: &ConfigData,
    ) -> Result<ConfigurationCreated> {
        let url = format!("{}/configs", self.base_url);
        let body = serde_json::json!({ "name": name, "data": data });

        self.send(self.client.post(&url).json(&body)).await
    }

    /// Store `data` as the next version of an existing configuration
    pub async fn update_config(
        &self,
        name: &str,
        data: &ConfigData,
    ) -> Result<ConfigurationUpdated> {
        let url = format!("{}/configs/{}", self.base_url, name);
        let body = serde_json::json!({ "data": data });

        self.send(self.client.put(&url).json(&body)).await
    }

    /// Re-publish an earlier version as the next version
    pub async fn rollback_config(
        &self,
        name: &str,
        target_version: i64,
    ) -> Result<ConfigurationRollback> {
        let url = format!("{}/configs/{}/rollback", self.base_url, name);
        let body = serde_json::json!({ "target_version": target_version });

        self.send(self.client.post(&url).json(&body)).await
    }

    /// Get the current version of a configuration
    pub async fn get_config(&self, name: &str) -> Result<ConfigurationData> {
        let url = format!("{}/configs/{}", self.base_url, name);
        self.send(self.client.get(&url)).await
    }

    /// Get a specific version of a configuration
    pub async fn get_config_version(&self, name: &str, version: i64) -> Result<ConfigurationData> {
        let url = format!("{}/configs/{}/versions/{}", self.base_url, name, version);
        self.send(self.client.get(&url)).await
    }

    /// List all versions of a configuration, newest first
    pub async fn list_versions(&self, name: &str) -> Result<VersionList> {
        let url = format!("{}/configs/{}/versions", self.base_url, name);
        self.send(self.client.get(&url)).await
    }

    /// Check if the service is healthy
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await?;

        Ok(response.status() == StatusCode::OK)
    }

    /// Sends the request and unwraps the success envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} {}", status, response.url());

        if status.is_success() {
            let envelope: SuccessResponse<T> = response.json().await?;
            return Ok(envelope.data);
        }

        let text = response.text().await?;
        let remote = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(envelope) => RemoteError {
                status: status.as_u16(),
                code: envelope.error.code,
                message: envelope.error.message,
                details: envelope.error.details,
            },
            Err(_) => RemoteError {
                status: status.as_u16(),
                code: "UNKNOWN".to_string(),
                message: if text.is_empty() {
                    status.to_string()
                } else {
                    text
                },
                details: None,
            },
        };

        Err(remote.into())
    }
}
