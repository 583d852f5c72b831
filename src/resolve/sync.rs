//! Resolution orchestrator: drive the registry through verify/lookup/update
//!
//! Per entry the flow is a small state machine: a cached contract id is
//! re-verified first; a miss or mismatch demotes the entry to a fresh lookup;
//! a lookup miss is logged and skipped so one bad descriptor never blocks the
//! rest of the registry.

use tracing::{info, instrument, warn};

use crate::common::errors::{Result, SyncError};
use crate::common::traits::ContractResolver;
use crate::config::types::{AppConfig, OverrideTable, SyncSettings};
use crate::gateway::session::GatewaySession;
use crate::registry::store::SymbolRegistry;
use crate::resolve::normalize::normalize;

/// Environment kill-switch; set to 1 to make every run fail outright
pub const KILL_SWITCH_ENV: &str = "FORCE_DISABLE_CONID_SYNC";

/// Run the verify/lookup pass over every registry entry.
///
/// Mutates the registry in memory and returns whether anything changed;
/// the caller decides about persistence. Normalized fields are used for
/// both the verify and the lookup request.
pub async fn sync_registry<R>(
    registry: &mut SymbolRegistry,
    resolver: &R,
    overrides: &OverrideTable,
    settings: &SyncSettings,
) -> Result<bool>
where
    R: ContractResolver + ?Sized,
{
    let mut changed = false;

    for key in registry.keys() {
        let Some(descriptor) = registry.descriptor(&key) else {
            continue;
        };
        let wanted = normalize(&key, &descriptor, overrides);

        // Always verify an existing conId against the current fields
        let needs_lookup = match descriptor.con_id {
            Some(cached) => {
                match resolver
                    .resolve(&key, &wanted, settings.verify_timeout())
                    .await?
                {
                    Some(found) if found.con_id == cached => {
                        info!("[{key}] conId={cached} verified");
                        false
                    }
                    Some(found) => {
                        info!(
                            "[{key}] cached conId={cached} disagrees with broker ({}), re-resolving",
                            found.con_id
                        );
                        true
                    }
                    None => {
                        info!("[{key}] cached conId={cached} no longer resolves, re-resolving");
                        true
                    }
                }
            }
            None => true,
        };

        if !needs_lookup {
            continue;
        }

        // Lookup is rarer and may need more broker-side work
        match resolver
            .resolve(&key, &wanted, settings.lookup_timeout())
            .await?
        {
            Some(resolved) => {
                if registry.apply(&key, &resolved) {
                    changed = true;
                }
                info!("[{key}] {resolved}");
            }
            None => {
                warn!(
                    "[{key}] no contract found ({} {})",
                    wanted.sec_type, wanted.symbol
                );
            }
        }
    }

    Ok(changed)
}

/// End-to-end entry point: load the registry, resolve every entry against
/// the gateway, persist in place if anything changed.
///
/// Returns whether the registry was modified. Only a failed connection
/// handshake propagates as an error; per-entry misses are skipped.
#[instrument(skip(config))]
pub async fn ensure_con_ids(config: &AppConfig) -> Result<bool> {
    if std::env::var(KILL_SWITCH_ENV).as_deref() == Ok("1") {
        return Err(SyncError::Disabled(KILL_SWITCH_ENV));
    }

    let mut registry = SymbolRegistry::load(&config.registry.path)?;
    info!(
        "Loaded {} entries from {}",
        registry.keys().len(),
        config.registry.path
    );

    let session = GatewaySession::connect(&config.gateway).await?;
    let resolver = session.resolver();

    let result = sync_registry(
        &mut registry,
        resolver.as_ref(),
        &config.overrides,
        &config.sync,
    )
    .await;

    for warning in resolver.warnings() {
        warn!("gateway warning: {warning}");
    }
    drop(resolver);
    session.disconnect().await;

    let changed = result?;
    if changed {
        registry.save()?;
        info!("Updated {}", config.registry.path);
    } else {
        info!("No registry changes (conIds current)");
    }
    Ok(changed)
}
