//! Gateway module - connection-facing side of contract resolution

pub mod correlator;
pub mod messages;
pub mod session;

pub use correlator::Correlator;
pub use session::GatewaySession;
