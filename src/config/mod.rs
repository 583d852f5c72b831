//! Config module - file/env configuration loading

pub mod loader;
pub mod types;

pub use loader::{load_config, load_from_env};
pub use types::{AppConfig, GatewayConfig, OverrideFields, OverrideTable, RegistryConfig, SyncSettings};
