//! conid_sync Library
//!
//! Reconciles a curated symbol registry against a broker gateway's contract
//! lookup service: normalize each descriptor, resolve it over a long-lived
//! duplex connection, score the returned candidates and write verified
//! contract ids back into the registry in place.

pub mod common;
pub mod config;
pub mod gateway;
pub mod registry;
pub mod resolve;

// Re-export commonly used types
pub use common::errors::{Result, SyncError};
pub use common::traits::ContractResolver;
pub use common::types::{InstrumentDescriptor, ResolvedContract};
pub use config::types::AppConfig;
pub use gateway::correlator::Correlator;
pub use gateway::session::GatewaySession;
pub use registry::store::SymbolRegistry;
pub use resolve::normalize::normalize;
pub use resolve::score::{pick_best, score_candidate};
pub use resolve::sync::{ensure_con_ids, sync_registry, KILL_SWITCH_ENV};
