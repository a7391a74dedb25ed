// Shared test helpers
#![allow(dead_code)]

use cfstats::analytics::{AnalyticsSource, FetchedBatch};
use cfstats::config::{Credentials, PipelineConfig};
use cfstats::error::RunError;
use cfstats::models::*;
use cfstats::query::RunWindow;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub fn traffic(datetime: &str, bytes: u64) -> TrafficRecord {
    TrafficRecord::new(datetime, bytes)
}

pub fn invocation(datetime: &str, script: &str, requests: u64, errors: u64) -> InvocationRecord {
    InvocationRecord {
        sum: InvocationSum {
            requests,
            errors,
            cpu_time: None,
        },
        dimensions: InvocationDimensions {
            datetime: Some(datetime.into()),
            script_name: Some(script.into()),
        },
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        account_id: "acct-123".into(),
        api_token: "token-abc".into(),
        zone_id: Some("zone-456".into()),
    }
}

pub fn traffic_pipeline() -> PipelineConfig {
    PipelineConfig {
        include_traffic_query: true,
        ..PipelineConfig::default()
    }
}

/// In-memory source: returns `batch`, or a remote error when `batch` is `None`.
pub struct FakeSource {
    pub batch: Option<FetchedBatch>,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn ok(batch: FetchedBatch) -> Self {
        Self {
            batch: Some(batch),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            batch: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AnalyticsSource for FakeSource {
    async fn fetch(
        &self,
        _window: &RunWindow,
        _credentials: &Credentials,
    ) -> Result<FetchedBatch, RunError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch
            .clone()
            .ok_or_else(|| RunError::Remote(vec!["authentication error".into()]))
    }
}
