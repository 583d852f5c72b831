//! Trait definitions for contract resolution

use async_trait::async_trait;
use std::time::Duration;

use super::errors::Result;
use super::types::{InstrumentDescriptor, ResolvedContract};

/// Trait for components that can resolve a descriptor to one broker contract.
///
/// The orchestrator only depends on this seam, so tests can script lookups
/// without a live gateway connection.
#[async_trait]
pub trait ContractResolver: Send + Sync {
    /// Resolve a normalized descriptor to the best-matching broker contract.
    ///
    /// Returns `Ok(None)` when the lookup times out or yields no usable
    /// candidate; only connection-level failures are errors.
    ///
    /// # Arguments
    /// * `key` - Registry key, used for logging only
    /// * `wanted` - Normalized descriptor to look up
    /// * `timeout` - How long to wait for the terminator signal
    async fn resolve(
        &self,
        key: &str,
        wanted: &InstrumentDescriptor,
        timeout: Duration,
    ) -> Result<Option<ResolvedContract>>;
}
