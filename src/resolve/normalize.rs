//! Descriptor normalization ahead of a gateway lookup
//!
//! Curated entries are written for humans (USDJPY, XAUUSD); the gateway wants
//! canonical broker fields. Normalization is a pure function of the key, the
//! input descriptor and the override table.

use crate::common::types::{
    InstrumentDescriptor, FX_EXCHANGE, METAL_BASES, SEC_TYPE_CASH, SEC_TYPE_CMDTY, SMART_EXCHANGE,
};
use crate::config::types::OverrideTable;

/// Produce the canonical lookup descriptor for one registry entry.
///
/// Rules, in order:
/// 1. merge any configured override for `key` (non-empty values win)
/// 2. upper-case the security type, default the exchange to smart routing
/// 3. FX pairs: split USDJPY into symbol USD / currency JPY on IDEALPRO
/// 4. metal spot pairs: split XAUUSD into symbol XAU / currency USD
pub fn normalize(
    key: &str,
    descriptor: &InstrumentDescriptor,
    overrides: &OverrideTable,
) -> InstrumentDescriptor {
    let mut out = descriptor.clone();

    if let Some(ov) = overrides.get(key) {
        merge_non_empty(&mut out.sec_type, ov.sec_type.as_deref());
        merge_non_empty(&mut out.symbol, ov.symbol.as_deref());
        merge_non_empty(&mut out.exchange, ov.exchange.as_deref());
        merge_non_empty(&mut out.currency, ov.currency.as_deref());
    }

    out.sec_type = out.sec_type.to_uppercase();
    if out.exchange.is_empty() {
        out.exchange = SMART_EXCHANGE.to_string();
    }

    // FX: USDJPY -> symbol=USD, currency=JPY, IDEALPRO
    if out.sec_type == SEC_TYPE_CASH && out.symbol.len() >= 6 && out.symbol.is_ascii() {
        let s = out.symbol.to_uppercase();
        let (base, quote) = (&s[..3], &s[s.len() - 3..]);
        if is_alpha(base) && is_alpha(quote) {
            out.symbol = base.to_string();
            out.currency = quote.to_string();
            out.exchange = FX_EXCHANGE.to_string();
        }
    }

    // Metals: XAUUSD/XAGUSD -> XAU/XAG + currency
    if out.sec_type == SEC_TYPE_CMDTY && out.symbol.len() >= 6 && out.symbol.is_ascii() {
        let s = out.symbol.to_uppercase();
        let (base, quote) = (&s[..3], &s[s.len() - 3..]);
        if METAL_BASES.contains(&base) && is_alpha(quote) {
            out.symbol = base.to_string();
            out.currency = quote.to_string();
        }
    }

    out
}

fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}

fn merge_non_empty(target: &mut String, replacement: Option<&str>) {
    if let Some(v) = replacement {
        if !v.is_empty() {
            *target = v.to_string();
        }
    }
}
