use serde::{Deserialize, Serialize};

use super::{Timed, parse_datetime};
use chrono::{DateTime, Utc};

/// One `workersInvocationsAdaptive` row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRecord {
    #[serde(default)]
    pub sum: InvocationSum,
    #[serde(default)]
    pub dimensions: InvocationDimensions,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationSum {
    #[serde(default)]
    pub requests: u64,
    #[serde(default)]
    pub errors: u64,
    /// Only queried when `pipeline.include_cpu_time` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationDimensions {
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub script_name: Option<String>,
}

impl Timed for InvocationRecord {
    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.dimensions.datetime.as_deref().and_then(parse_datetime)
    }
}
