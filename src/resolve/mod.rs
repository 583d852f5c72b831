//! Resolve module - normalization, scoring and the sync orchestrator

pub mod normalize;
pub mod score;
pub mod sync;

pub use normalize::normalize;
pub use score::{pick_best, score_candidate};
pub use sync::{ensure_con_ids, sync_registry, KILL_SWITCH_ENV};
