// Dashboard models: GraphQL analytics rows and the persisted snapshot document.

mod invocation;
mod snapshot;
mod traffic;

pub use invocation::{InvocationDimensions, InvocationRecord, InvocationSum};
pub use snapshot::{Snapshot, UsageSummary, format_instant};
pub use traffic::{TrafficDimensions, TrafficRecord, TrafficSum};

use chrono::{DateTime, Utc};

/// A record keyed by the instant its `dimensions.datetime` names.
pub trait Timed {
    /// Parsed timestamp, or `None` when the row carries no usable datetime.
    fn timestamp(&self) -> Option<DateTime<Utc>>;
}

/// Parse an RFC 3339 datetime as reported by the analytics API.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
