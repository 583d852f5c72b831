//! Gateway-specific wire message types
//!
//! The lookup endpoint speaks JSON text frames. Only the contract-details
//! request and its paired candidate/terminator stream are modeled; everything
//! else the gateway can say arrives as `Unknown` and is ignored.

use serde::{Deserialize, Serialize};

use crate::common::types::{InstrumentDescriptor, ResolvedContract};

/// Outbound messages to the lookup endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    /// Request the contract details stream for one descriptor
    ReqContractDetails {
        #[serde(rename = "reqId")]
        req_id: i64,
        contract: ContractPayload,
    },
}

/// Inbound messages from the lookup endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingMessage {
    /// Initial handshake: the first request id this session may use
    NextValidId {
        #[serde(rename = "orderId")]
        order_id: i64,
    },
    /// One candidate for a pending request
    ContractDetails {
        #[serde(rename = "reqId")]
        req_id: i64,
        contract: ContractPayload,
    },
    /// Terminator: no more candidates for this request id
    ContractDetailsEnd {
        #[serde(rename = "reqId")]
        req_id: i64,
    },
    /// Error or warning report, possibly tied to a request id
    Error {
        #[serde(rename = "reqId", default)]
        req_id: i64,
        code: i64,
        message: String,
    },
    /// Anything else the gateway sends
    #[serde(other)]
    Unknown,
}

/// Contract fields as the broker spells them on the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub con_id: Option<i64>,
    #[serde(default)]
    pub sec_type: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub exchange: String,
    #[serde(default)]
    pub currency: String,
    #[serde(
        default,
        rename = "lastTradeDateOrContractMonth",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_trade_date: Option<String>,
}

impl From<&InstrumentDescriptor> for ContractPayload {
    fn from(d: &InstrumentDescriptor) -> Self {
        Self {
            con_id: d.con_id,
            sec_type: d.sec_type.clone(),
            symbol: d.symbol.clone(),
            exchange: d.exchange.clone(),
            currency: d.currency.clone(),
            // The expiry narrows futures lookups; other types ignore it
            last_trade_date: if d.is_futures() {
                d.last_trade_date.clone()
            } else {
                None
            },
        }
    }
}

impl From<ContractPayload> for ResolvedContract {
    fn from(p: ContractPayload) -> Self {
        Self {
            con_id: p.con_id.unwrap_or_default(),
            sec_type: p.sec_type,
            symbol: p.symbol,
            exchange: p.exchange,
            currency: p.currency,
            last_trade_date: p.last_trade_date,
        }
    }
}
