use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use shared_types::{
    ConfigurationCreated, ConfigurationData, ConfigurationRollback, ConfigurationUpdated,
    SuccessResponse, VersionList,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    dto::{
        CreateConfigRequest, RollbackConfigRequest, UpdateConfigRequest, created_response,
        rollback_response, updated_response,
    },
    error::{ApiError, ApiResult, is_valid_config_name},
    state::AppState,
};

const CREATE_REQUIRED_FIELDS: &[&str] = &["name", "data"];
const UPDATE_REQUIRED_FIELDS: &[&str] = &["data"];
const ROLLBACK_REQUIRED_FIELDS: &[&str] = &["target_version"];

/// POST /configs
/// Create a configuration at version 1
#[instrument(skip(state, payload))]
pub async fn create_config(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateConfigRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<ConfigurationCreated>>)> {
    let Json(request) = payload?;

    let name = request
        .name
        .filter(|name| !name.is_empty())
        .ok_or(ApiError::MissingRequiredField {
            field: "name",
            required: CREATE_REQUIRED_FIELDS,
        })?;
    let data = request.data.ok_or(ApiError::MissingRequiredField {
        field: "data",
        required: CREATE_REQUIRED_FIELDS,
    })?;

    if !is_valid_config_name(&name) {
        return Err(ApiError::InvalidConfigName(name));
    }

    info!("Creating config: {}", name);

    let config = state.service.create_config(&name, data.get()).await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_message(
            "Configuration created successfully",
            created_response(config),
        )),
    ))
}

/// PUT /configs/:name
/// Append a new version with the given data
#[instrument(skip(state, payload))]
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    payload: Result<Json<UpdateConfigRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse<ConfigurationUpdated>>> {
    let Json(request) = payload?;

    let data = request.data.ok_or(ApiError::MissingRequiredField {
        field: "data",
        required: UPDATE_REQUIRED_FIELDS,
    })?;

    info!("Updating config: {}", name);

    let config = state.service.update_config(&name, data.get()).await?;

    Ok(Json(SuccessResponse::with_message(
        "Configuration updated successfully",
        updated_response(config),
    )))
}

/// POST /configs/:name/rollback
/// Append a copy of an earlier version as the new current version
#[instrument(skip(state, payload))]
pub async fn rollback_config(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    payload: Result<Json<RollbackConfigRequest>, JsonRejection>,
) -> ApiResult<Json<SuccessResponse<ConfigurationRollback>>> {
    let Json(request) = payload?;

    let target_version = request
        .target_version
        .ok_or(ApiError::MissingRequiredField {
            field: "target_version",
            required: ROLLBACK_REQUIRED_FIELDS,
        })?;

    info!("Rolling back config {} to version {}", name, target_version);

    let config = state.service.rollback_config(&name, target_version).await?;

    Ok(Json(SuccessResponse::with_message(
        "Configuration rolled back successfully",
        rollback_response(config, target_version),
    )))
}

/// GET /configs/:name
/// Get the current version of a configuration
#[instrument(skip(state))]
pub async fn get_config(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<SuccessResponse<ConfigurationData>>> {
    let data = state.service.get_latest_config(&name).await?;
    Ok(Json(SuccessResponse::new(data)))
}

/// GET /configs/:name/versions/:version
/// Get a specific version of a configuration
#[instrument(skip(state))]
pub async fn get_config_version(
    State(state): State<Arc<AppState>>,
    Path((name, version)): Path<(String, String)>,
) -> ApiResult<Json<SuccessResponse<ConfigurationData>>> {
    let version_number = version
        .parse::<i64>()
        .map_err(|_| ApiError::InvalidVersionNumber(version.clone()))?;

    let data = state
        .service
        .get_config_version(&name, version_number)
        .await?;
    Ok(Json(SuccessResponse::new(data)))
}

/// GET /configs/:name/versions
/// List all versions of a configuration, newest first
#[instrument(skip(state))]
pub async fn list_versions(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<SuccessResponse<VersionList>>> {
    let versions = state.service.list_versions(&name).await?;
    Ok(Json(SuccessResponse::new(versions)))
}

/// GET /health
/// Health check endpoint, reports whether the database answers
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    let timestamp = chrono::Utc::now().to_rfc3339();

    match state.service.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "service": "versioned-config",
                "database": "connected",
                "timestamp": timestamp,
            })),
        ),
        Err(err) => {
            warn!("Health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "service": "versioned-config",
                    "database": "disconnected",
                    "timestamp": timestamp,
                })),
            )
        }
    }
}
