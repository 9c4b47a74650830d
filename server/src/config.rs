use anyhow::{Context, Result};
use std::net::SocketAddr;

use crate::storage::StorageConfig;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Process configuration read at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub storage: StorageConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_address =
            lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = raw_address
            .parse::<SocketAddr>()
            .with_context(|| format!("BIND_ADDRESS is not a socket address: '{raw_address}'"))?;
        let storage = StorageConfig::from_lookup(&lookup)?;

        Ok(Self {
            bind_address,
            storage,
        })
    }
}
