//! Mapping between the table's `BIGSERIAL` key and application ids.
//!
//! These two functions are the only place native keys are converted. The
//! application id is the canonical decimal form of the key, so the pair
//! round-trips exactly and no two strings map to the same row.

use bounce_core::types::CheckId;

pub fn native_id_to_string(native: i64) -> CheckId {
    native.to_string()
}

/// Parse an application id back into a native key.
///
/// Only the canonical form is accepted: no sign, no leading zeros, no
/// whitespace, strictly positive. Anything else can never name a row.
pub fn parse_native_id(id: &str) -> Option<i64> {
    let canonical = !id.is_empty()
        && id.bytes().all(|b| b.is_ascii_digit())
        && !id.starts_with('0');
    if !canonical {
        return None;
    }
    id.parse::<i64>().ok().filter(|n| *n > 0)
}
