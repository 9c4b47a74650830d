use anyhow::Result;
use server::{config::ServerConfig, http, service::ConfigService, storage::SqliteBackend};
use std::sync::Arc;
use tracing::{Level, info};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    info!("Starting versioned config server");

    let config = ServerConfig::from_env()?;
    info!("Using storage: {:?}", config.storage);

    // Open the store once for the whole process
    let storage = SqliteBackend::from_config(config.storage)?;
    let service = Arc::new(ConfigService::new(Arc::new(storage))?);

    // Start the HTTP server
    http::start_server(
        Arc::clone(&service),
        config.bind_address,
        http::shutdown_signal(),
    )
    .await?;

    service.shutdown().await?;
    info!("Server stopped");

    Ok(())
}
