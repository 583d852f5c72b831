//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{Result, SyncError};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    // Add default config file if it exists
    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    // Add environment variables with APP_ prefix
    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true),
    );

    // Also check for gateway-specific env vars (CONID_GATEWAY_HOST, ...)
    builder = builder.add_source(
        Environment::default()
            .prefix("CONID")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| SyncError::Configuration(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| SyncError::Configuration(e.to_string()))
}

/// Load configuration from environment variables only
pub fn load_from_env() -> Result<AppConfig> {
    // Try to load from .env file
    dotenvy::dotenv().ok();

    let mut cfg = AppConfig::default();
    if let Ok(host) = std::env::var("CONID_GATEWAY_HOST") {
        cfg.gateway.host = host;
    }
    if let Ok(port) = std::env::var("CONID_GATEWAY_PORT") {
        cfg.gateway.port = port
            .parse()
            .map_err(|_| SyncError::Configuration(format!("invalid port: {port}")))?;
    }
    if let Ok(client_id) = std::env::var("CONID_GATEWAY_CLIENT_ID") {
        cfg.gateway.client_id = client_id
            .parse()
            .map_err(|_| SyncError::Configuration(format!("invalid client id: {client_id}")))?;
    }
    if let Ok(path) = std::env::var("CONID_REGISTRY_PATH") {
        cfg.registry.path = path;
    }
    Ok(cfg)
}
