use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::{InvocationRecord, TrafficRecord};

/// The JSON document the dashboard reads. Field names are a stable contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub updated_at: String,
    /// Latest full-window invocation pull; replaced every run.
    #[serde(default)]
    pub data: Vec<InvocationRecord>,
    /// Accumulated hourly traffic, deduplicated and retention-bounded.
    #[serde(default)]
    pub traffic: Vec<TrafficRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageSummary>,
}

/// Month-to-date request usage against the plan limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummary {
    pub requests: u64,
    pub limit: u64,
}

impl Snapshot {
    pub fn new(
        updated_at: DateTime<Utc>,
        data: Vec<InvocationRecord>,
        traffic: Vec<TrafficRecord>,
        usage: Option<UsageSummary>,
    ) -> Self {
        Self {
            updated_at: format_instant(updated_at),
            data,
            traffic,
            usage,
        }
    }
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
pub fn format_instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}
