//! Configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gateway connection configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Registry document configuration
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Resolution timeouts and logging
    #[serde(default)]
    pub sync: SyncSettings,
    /// Per-key descriptor overrides applied before lookup
    #[serde(default = "default_overrides")]
    pub overrides: OverrideTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            registry: RegistryConfig::default(),
            sync: SyncSettings::default(),
            overrides: default_overrides(),
        }
    }
}

/// Broker gateway connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway host
    #[serde(default = "default_host")]
    pub host: String,
    /// Gateway port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Client identity, rate-limited on reuse by the gateway
    #[serde(default = "default_client_id")]
    pub client_id: i64,
    /// How long to wait for the initial valid request id
    #[serde(default = "default_handshake_timeout")]
    pub handshake_timeout_secs: u64,
    /// Grace period after disconnect before the client id may be reused
    #[serde(default = "default_release_grace")]
    pub client_release_grace_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            client_id: default_client_id(),
            handshake_timeout_secs: default_handshake_timeout(),
            client_release_grace_secs: default_release_grace(),
        }
    }
}

impl GatewayConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }

    pub fn client_release_grace(&self) -> Duration {
        Duration::from_secs(self.client_release_grace_secs)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4003
}

fn default_client_id() -> i64 {
    123
}

fn default_handshake_timeout() -> u64 {
    10
}

fn default_release_grace() -> u64 {
    5
}

/// Registry document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path to the symbol registry document
    #[serde(default = "default_registry_path")]
    pub path: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
        }
    }
}

fn default_registry_path() -> String {
    "config/symbols.toml".to_string()
}

/// Resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Timeout for re-verifying an already-cached contract id
    #[serde(default = "default_verify_timeout")]
    pub verify_timeout_secs: u64,
    /// Timeout for a fresh lookup (rarer, may need more broker-side work)
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            verify_timeout_secs: default_verify_timeout(),
            lookup_timeout_secs: default_lookup_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl SyncSettings {
    pub fn verify_timeout(&self) -> Duration {
        Duration::from_secs(self.verify_timeout_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

fn default_verify_timeout() -> u64 {
    10
}

fn default_lookup_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Per-key override table, keyed by registry entry name
pub type OverrideTable = HashMap<String, OverrideFields>;

/// Fields forced onto a registry entry before lookup.
///
/// Only non-empty values win over the curated entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideFields {
    #[serde(default)]
    pub sec_type: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Curated overrides: force CFD routing for index/oil entries
pub fn default_overrides() -> OverrideTable {
    let mut table = OverrideTable::new();
    table.insert(
        "US100".to_string(),
        OverrideFields {
            sec_type: Some("CFD".to_string()),
            exchange: Some("SMART".to_string()),
            currency: Some("USD".to_string()),
            symbol: None,
        },
    );
    table.insert(
        "OIL.WTI".to_string(),
        OverrideFields {
            sec_type: Some("CFD".to_string()),
            exchange: Some("SMART".to_string()),
            currency: Some("USD".to_string()),
            symbol: None,
        },
    );
    table
}
