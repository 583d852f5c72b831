//! Candidate scoring against a wanted descriptor
//!
//! A lookup can return many candidates (a futures chain, cross-listed
//! venues). Scoring is additive and deterministic; ties keep the broker's
//! order, so repeated runs pick the same contract.

use chrono::NaiveDate;

use crate::common::types::{InstrumentDescriptor, ResolvedContract};

/// Most a near expiry can contribute; also the day horizon of the bonus
const PROXIMITY_CAP: i64 = 100;

/// Score one candidate against the wanted descriptor.
///
/// Each field criterion counts only when the wanted side is non-empty and
/// matches case-insensitively. For futures, a parseable expiry that is
/// today-or-later adds up to [`PROXIMITY_CAP`], nearer dates scoring higher.
pub fn score_candidate(
    wanted: &InstrumentDescriptor,
    candidate: &ResolvedContract,
    today: NaiveDate,
) -> i64 {
    let mut score = 0;
    if field_matches(&wanted.sec_type, &candidate.sec_type) {
        score += 10;
    }
    if field_matches(&wanted.currency, &candidate.currency) {
        score += 5;
    }
    if field_matches(&wanted.exchange, &candidate.exchange) {
        score += 4;
    }
    if field_matches(&wanted.symbol, &candidate.symbol) {
        score += 4;
    }
    if wanted.is_futures() {
        if let Some(expiry) = &candidate.last_trade_date {
            score += proximity_bonus(expiry, today);
        }
    }
    score
}

/// Pick the best-scoring candidate, or `None` on an empty set.
///
/// Sorting is stable and descending, so equal scores keep the order the
/// broker returned them in.
pub fn pick_best(
    wanted: &InstrumentDescriptor,
    mut candidates: Vec<ResolvedContract>,
    today: NaiveDate,
) -> Option<ResolvedContract> {
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by_key(|c| std::cmp::Reverse(score_candidate(wanted, c, today)));
    candidates.into_iter().next()
}

fn field_matches(wanted: &str, candidate: &str) -> bool {
    !wanted.is_empty() && wanted.eq_ignore_ascii_case(candidate)
}

/// Bonus for a not-yet-expired contract; 0 for past or unparseable dates
fn proximity_bonus(expiry: &str, today: NaiveDate) -> i64 {
    let Some(date) = parse_expiry(expiry) else {
        return 0;
    };
    let days = (date - today).num_days();
    if days < 0 {
        return 0;
    }
    PROXIMITY_CAP - days.min(PROXIMITY_CAP)
}

/// Accepts YYYYMMDD or YYYYMM (taken as the first of the month)
fn parse_expiry(expiry: &str) -> Option<NaiveDate> {
    match expiry.len() {
        8 => NaiveDate::parse_from_str(expiry, "%Y%m%d").ok(),
        6 => NaiveDate::parse_from_str(&format!("{expiry}01"), "%Y%m%d").ok(),
        _ => None,
    }
}
