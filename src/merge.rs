// Incremental merge of a time-keyed series with retention pruning.
// Pure: no I/O, no clock. The caller passes `now`.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::models::{Timed, TrafficRecord};

/// Merge `fresh` over `existing` keyed by timestamp, sort ascending, and drop
/// anything strictly older than `now - retention_days`.
///
/// A fresh record replaces a stored one with the same instant: the API revises
/// recent buckets after the fact. Rows without a usable timestamp are skipped.
pub fn merge<T: Timed + Clone>(
    existing: &[T],
    fresh: &[T],
    now: DateTime<Utc>,
    retention_days: u32,
) -> Vec<T> {
    let mut by_ts: HashMap<DateTime<Utc>, T> =
        HashMap::with_capacity(existing.len() + fresh.len());
    for record in existing.iter().chain(fresh) {
        if let Some(ts) = record.timestamp() {
            by_ts.insert(ts, record.clone());
        }
    }

    let cutoff = retention_cutoff(now, retention_days);
    let mut merged: Vec<(DateTime<Utc>, T)> =
        by_ts.into_iter().filter(|(ts, _)| *ts >= cutoff).collect();
    merged.sort_by_key(|(ts, _)| *ts);
    merged.into_iter().map(|(_, record)| record).collect()
}

pub fn merge_traffic(
    existing: &[TrafficRecord],
    fresh: &[TrafficRecord],
    now: DateTime<Utc>,
    retention_days: u32,
) -> Vec<TrafficRecord> {
    merge(existing, fresh, now, retention_days)
}

/// Oldest instant still inside the retention window.
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(retention_days))
}
