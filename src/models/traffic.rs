use serde::{Deserialize, Serialize};

use super::{Timed, parse_datetime};
use chrono::{DateTime, Utc};

/// One hourly `httpRequestsAdaptiveGroups` row (zone egress volume).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficRecord {
    #[serde(default)]
    pub sum: TrafficSum,
    /// A row without dimensions decodes with `datetime: None` and is dropped by the merge.
    #[serde(default)]
    pub dimensions: TrafficDimensions,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSum {
    #[serde(default)]
    pub edge_response_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficDimensions {
    #[serde(default)]
    pub datetime: Option<String>,
}

impl TrafficRecord {
    /// Convenience constructor used by tests and fixtures.
    pub fn new(datetime: impl Into<String>, edge_response_bytes: u64) -> Self {
        Self {
            sum: TrafficSum {
                edge_response_bytes,
            },
            dimensions: TrafficDimensions {
                datetime: Some(datetime.into()),
            },
        }
    }
}

impl Timed for TrafficRecord {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.dimensions.datetime.as_deref().and_then(parse_datetime)
    }
}
