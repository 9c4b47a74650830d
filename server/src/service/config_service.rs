use shared_types::{ConfigData, ConfigurationData, VersionInfo, VersionList};
use std::sync::Arc;
use tracing::{info, instrument};

use super::error::{ServiceError, ServiceResult};
use super::validation::SchemaValidator;
use crate::storage::{ConfigStorage, Configuration, Version};

/// Entry point for the HTTP layer: validates payloads, then delegates to storage.
///
/// Storage and validation errors are passed through unchanged.
pub struct ConfigService {
    storage: Arc<dyn ConfigStorage>,
    validator: SchemaValidator,
}

impl ConfigService {
    pub fn new(storage: Arc<dyn ConfigStorage>) -> ServiceResult<Self> {
        Ok(Self {
            storage,
            validator: SchemaValidator::new()?,
        })
    }

    /// Validates `payload` and stores it as version 1 of a new configuration.
    #[instrument(skip(self, payload))]
    pub async fn create_config(&self, name: &str, payload: &str) -> ServiceResult<Configuration> {
        self.validator.validate_str(payload)?;
        let config = self.storage.create_configuration(name, payload).await?;
        info!(name, "Configuration created");
        Ok(config)
    }

    /// Validates `payload` and appends it as the next version.
    #[instrument(skip(self, payload))]
    pub async fn update_config(&self, name: &str, payload: &str) -> ServiceResult<Configuration> {
        self.validator.validate_str(payload)?;
        let config = self.storage.update_configuration(name, payload).await?;
        info!(name, version = config.current_version, "Configuration updated");
        Ok(config)
    }

    /// Appends a copy of `target_version` as the next version.
    ///
    /// The copied payload is not re-validated; it passed the same fixed
    /// schema when it was first stored.
    #[instrument(skip(self))]
    pub async fn rollback_config(
        &self,
        name: &str,
        target_version: i64,
    ) -> ServiceResult<Configuration> {
        ensure_positive(target_version)?;
        let config = self
            .storage
            .rollback_configuration(name, target_version)
            .await?;
        info!(
            name,
            target_version,
            version = config.current_version,
            "Configuration rolled back"
        );
        Ok(config)
    }

    #[instrument(skip(self))]
    pub async fn get_latest_config(&self, name: &str) -> ServiceResult<ConfigurationData> {
        let (config, version) = self.storage.get_latest_configuration(name).await?;
        Ok(ConfigurationData {
            data: parse_payload(&version)?,
            name: config.name,
            version: config.current_version,
            created_at: version.created_at,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_config_version(
        &self,
        name: &str,
        version_number: i64,
    ) -> ServiceResult<ConfigurationData> {
        ensure_positive(version_number)?;
        let version = self
            .storage
            .get_configuration_version(name, version_number)
            .await?;
        Ok(ConfigurationData {
            data: parse_payload(&version)?,
            name: version.configuration_name,
            version: version.version_number,
            created_at: version.created_at,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_versions(&self, name: &str) -> ServiceResult<VersionList> {
        let (config, versions) = self.storage.list_versions(name).await?;
        Ok(VersionList {
            name: config.name,
            current_version: config.current_version,
            versions: versions
                .into_iter()
                .map(|v| VersionInfo {
                    version: v.version_number,
                    created_at: v.created_at,
                })
                .collect(),
        })
    }

    pub async fn health_check(&self) -> ServiceResult<()> {
        Ok(self.storage.ping().await?)
    }

    /// Closes the underlying store; later calls fail with a storage error.
    pub async fn shutdown(&self) -> ServiceResult<()> {
        Ok(self.storage.close().await?)
    }
}

fn ensure_positive(version: i64) -> ServiceResult<()> {
    if version < 1 {
        return Err(ServiceError::InvalidVersionNumber(version));
    }
    Ok(())
}

fn parse_payload(version: &Version) -> ServiceResult<ConfigData> {
    serde_json::from_str(&version.json_data).map_err(|err| ServiceError::CorruptPayload {
        name: version.configuration_name.clone(),
        version: version.version_number,
        reason: err.to_string(),
    })
}
