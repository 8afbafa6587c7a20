//! Timestamp parsing and ordering helpers shared by the pipeline stages.

use chrono::NaiveDateTime;

use crate::constants::time::{TIMESTAMP_FORMAT, TIMESTAMP_PREFIX_LEN};
use crate::errors::PrepError;
use crate::types::Timestamp;

/// Parse a raw log timestamp into epoch seconds (UTC).
///
/// Only the first 19 characters (`YYYY-MM-DD HH:MM:SS`) are considered, so
/// fractional seconds and zone suffixes such as `2020-01-01 10:00:00.123+00`
/// are truncated away.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, PrepError> {
    let prefix = raw
        .get(..TIMESTAMP_PREFIX_LEN)
        .ok_or_else(|| PrepError::Parse {
            value: raw.to_string(),
            reason: format!("expected at least {TIMESTAMP_PREFIX_LEN} characters"),
        })?;
    let parsed =
        NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT).map_err(|err| PrepError::Parse {
            value: raw.to_string(),
            reason: err.to_string(),
        })?;
    Ok(parsed.and_utc().timestamp())
}

/// Row positions sorted by `key`, ties kept in input order.
pub fn stable_order_by_key<V, K, F>(values: &[V], key: F) -> Vec<usize>
where
    K: Ord,
    F: Fn(&V) -> K,
{
    let mut order: Vec<usize> = (0..values.len()).collect();
    // `sort_by_key` is stable.
    order.sort_by_key(|&idx| key(&values[idx]));
    order
}
