#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use client::{ConfigClient, RemoteError};
use mockito::{self, Matcher};
use serde_json::json;
use shared_types::ConfigData;

#[tokio::test]
async fn test_health_check() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status":"healthy"}"#)
        .create();

    let client = ConfigClient::new(server.url()).unwrap();
    let healthy = client.health_check().await.unwrap();
    assert!(healthy);
}

#[tokio::test]
async fn test_health_check_unavailable() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/health")
        .with_status(503)
        .with_body(r#"{"status":"unhealthy"}"#)
        .create();

    let client = ConfigClient::new(server.url()).unwrap();
    assert!(!client.health_check().await.unwrap());
}

#[tokio::test]
async fn test_create_config() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("POST", "/configs")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "name": "app",
            "data": {"max_limit": 1000, "enabled": true}
        })))
        .with_status(201)
        .with_body(
            r#"{
                "success": true,
                "message": "Configuration created successfully",
                "data": {"name": "app", "version": 1, "created_at": "2024-05-01T12:00:00Z"}
            }"#,
        )
        .create();

    let client = ConfigClient::new(server.url()).unwrap();
    let created = client
        .create_config("app", &ConfigData::new(1000, true))
        .await
        .unwrap();

    assert_eq!(created.name, "app");
    assert_eq!(created.version, 1);
}

#[tokio::test]
async fn test_update_config() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("PUT", "/configs/app")
        .match_body(Matcher::Json(json!({
            "data": {"max_limit": 2000, "enabled": false}
        })))
        .with_status(200)
        .with_body(
            r#"{
                "success": true,
                "data": {"name": "app", "version": 2, "updated_at": "2024-05-01T12:00:00Z"}
            }"#,
        )
        .create();

    let client = ConfigClient::new(server.url()).unwrap();
    let updated = client
        .update_config("app", &ConfigData::new(2000, false))
        .await
        .unwrap();

    assert_eq!(updated.version, 2);
}

#[tokio::test]
async fn test_rollback_config() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("POST", "/configs/app/rollback")
        .match_body(Matcher::Json(json!({"target_version": 1})))
        .with_status(200)
        .with_body(
            r#"{
                "success": true,
                "data": {
                    "name": "app",
                    "new_version": 3,
                    "target_version": 1,
                    "rolled_back_at": "2024-05-01T12:00:00Z"
                }
            }"#,
        )
        .create();

    let client = ConfigClient::new(server.url()).unwrap();
    let rolled_back = client.rollback_config("app", 1).await.unwrap();

    assert_eq!(rolled_back.new_version, 3);
    assert_eq!(rolled_back.target_version, 1);
}

#[tokio::test]
async fn test_get_config() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/configs/app")
        .with_status(200)
        .with_body(
            r#"{
                "success": true,
                "data": {
                    "name": "app",
                    "version": 3,
                    "data": {"max_limit": 1000, "enabled": true},
                    "created_at": "2024-05-01T12:00:00Z"
                }
            }"#,
        )
        .create();

    let client = ConfigClient::new(server.url()).unwrap();
    let config = client.get_config("app").await.unwrap();

    assert_eq!(config.version, 3);
    assert_eq!(config.data, ConfigData::new(1000, true));
}

#[tokio::test]
async fn test_get_config_version() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/configs/app/versions/2")
        .with_status(200)
        .with_body(
            r#"{
                "success": true,
                "data": {
                    "name": "app",
                    "version": 2,
                    "data": {"max_limit": 2000, "enabled": false},
                    "created_at": "2024-05-01T12:00:00Z"
                }
            }"#,
        )
        .create();

    let client = ConfigClient::new(server.url()).unwrap();
    let config = client.get_config_version("app", 2).await.unwrap();

    assert_eq!(config.version, 2);
    assert!(!config.data.enabled);
}

#[tokio::test]
async fn test_list_versions() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/configs/app/versions")
        .with_status(200)
        .with_body(
            r#"{
                "success": true,
                "data": {
                    "name": "app",
                    "current_version": 2,
                    "versions": [
                        {"version": 2, "created_at": "2024-05-01T12:05:00Z"},
                        {"version": 1, "created_at": "2024-05-01T12:00:00Z"}
                    ]
                }
            }"#,
        )
        .create();

    let client = ConfigClient::new(server.url()).unwrap();
    let list = client.list_versions("app").await.unwrap();

    assert_eq!(list.current_version, 2);
    let versions: Vec<i64> = list.versions.iter().map(|v| v.version).collect();
    assert_eq!(versions, vec![2, 1]);
}

#[tokio::test]
async fn test_get_config_not_found() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/configs/missing")
        .with_status(404)
        .with_body(
            r#"{
                "success": false,
                "error": {"code": "CONFIG_NOT_FOUND", "message": "Configuration 'missing' not found"}
            }"#,
        )
        .create();

    let client = ConfigClient::new(server.url()).unwrap();
    let err = client.get_config("missing").await.unwrap_err();

    let remote = err.downcast_ref::<RemoteError>().unwrap();
    assert!(remote.is_not_found());
    assert_eq!(remote.code, "CONFIG_NOT_FOUND");
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_schema_violation_details() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("POST", "/configs")
        .with_status(422)
        .with_body(
            r#"{
                "success": false,
                "error": {
                    "code": "SCHEMA_VALIDATION_FAILED",
                    "message": "Schema validation failed",
                    "details": {"validation_errors": [{"field": "/max_limit", "error": "bad"}]}
                }
            }"#,
        )
        .create();

    let client = ConfigClient::new(server.url()).unwrap();
    let err = client
        .create_config("app", &ConfigData::new(1, true))
        .await
        .unwrap_err();

    let remote = err.downcast_ref::<RemoteError>().unwrap();
    assert_eq!(remote.status, 422);
    assert_eq!(remote.code, "SCHEMA_VALIDATION_FAILED");
    let details = remote.details.as_ref().unwrap();
    assert_eq!(details["validation_errors"][0]["field"], "/max_limit");
}

#[tokio::test]
async fn test_error_without_envelope() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/configs/app")
        .with_status(502)
        .with_body("Bad Gateway")
        .create();

    let client = ConfigClient::new(server.url()).unwrap();
    let err = client.get_config("app").await.unwrap_err();

    let remote = err.downcast_ref::<RemoteError>().unwrap();
    assert_eq!(remote.status, 502);
    assert_eq!(remote.code, "UNKNOWN");
    assert_eq!(remote.message, "Bad Gateway");
}
