//! Unified descriptor and candidate types used across the crate

use serde::{Deserialize, Serialize};

/// Smart-routing exchange used when an entry does not name a venue
pub const SMART_EXCHANGE: &str = "SMART";

/// Venue forced for FX cash pairs
pub const FX_EXCHANGE: &str = "IDEALPRO";

/// Security type denoting an FX cash pair
pub const SEC_TYPE_CASH: &str = "CASH";

/// Security type denoting a spot commodity
pub const SEC_TYPE_CMDTY: &str = "CMDTY";

/// Security type denoting a futures contract
pub const SEC_TYPE_FUT: &str = "FUT";

/// Recognized metal spot base codes (XAUUSD -> XAU + USD)
pub const METAL_BASES: [&str; 4] = ["XAU", "XAG", "XPT", "XPD"];

/// Identifying fields for one instrument as curated in the registry.
///
/// String fields use the empty string for "absent" to mirror the registry
/// document, where operators routinely leave keys out. The broker-assigned
/// contract id and the expiry field are genuinely optional and carry that
/// through the type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentDescriptor {
    /// Security type (CASH, CMDTY, FUT, CFD, STK, ...)
    #[serde(default)]
    pub sec_type: String,
    /// Instrument symbol as curated (may be a combined pair like USDJPY)
    #[serde(default)]
    pub symbol: String,
    /// Venue, empty means smart routing
    #[serde(default)]
    pub exchange: String,
    /// Quote currency
    #[serde(default)]
    pub currency: String,
    /// Previously-cached broker contract id, if any
    #[serde(default)]
    pub con_id: Option<i64>,
    /// Expiry-like field, only meaningful for futures (YYYYMMDD or YYYYMM)
    #[serde(default)]
    pub last_trade_date: Option<String>,
}

impl InstrumentDescriptor {
    /// True when this descriptor names a futures contract
    pub fn is_futures(&self) -> bool {
        self.sec_type.eq_ignore_ascii_case(SEC_TYPE_FUT)
    }
}

/// One broker-returned candidate for a lookup request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedContract {
    /// Broker-assigned stable contract id
    pub con_id: i64,
    pub sec_type: String,
    pub symbol: String,
    pub exchange: String,
    pub currency: String,
    /// Expiry string for futures-like contracts, verbatim from the broker
    pub last_trade_date: Option<String>,
}

impl ResolvedContract {
    pub fn is_futures(&self) -> bool {
        self.sec_type.eq_ignore_ascii_case(SEC_TYPE_FUT)
    }
}

impl std::fmt::Display for ResolvedContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "conId={} | {} {}.{} @ {}",
            self.con_id, self.sec_type, self.symbol, self.currency, self.exchange
        )
    }
}
