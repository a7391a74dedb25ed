// One run: fetch -> read previous snapshot -> merge -> write.
// Nothing is written unless the fetch succeeded and the whole snapshot is assembled.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};

use crate::analytics::{AnalyticsSource, FetchedBatch};
use crate::config::{AppConfig, Credentials, PipelineConfig};
use crate::error::RunError;
use crate::merge::merge_traffic;
use crate::models::{Snapshot, UsageSummary};
use crate::query::RunWindow;
use crate::snapshot_store::{read_snapshot, write_snapshot};

/// Counts reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub invocations: usize,
    pub fresh_traffic: usize,
    pub merged_traffic: usize,
    /// Stored + fresh rows that did not survive dedup or retention.
    pub dropped_traffic: usize,
}

/// Assemble the next snapshot from the previous one and a fresh batch. Pure.
pub fn build_snapshot(
    existing: Option<&Snapshot>,
    batch: &FetchedBatch,
    now: DateTime<Utc>,
    config: &PipelineConfig,
) -> Snapshot {
    let stored = existing.map(|s| s.traffic.as_slice()).unwrap_or_default();
    let traffic = merge_traffic(stored, &batch.traffic, now, config.retention_days);
    let usage = batch.usage_requests.map(|requests| UsageSummary {
        requests,
        limit: config.monthly_request_limit,
    });
    Snapshot::new(now, batch.invocations.clone(), traffic, usage)
}

#[instrument(skip_all, fields(output = %config.output.path, now = %now))]
pub async fn run_once<S: AnalyticsSource>(
    source: &S,
    config: &AppConfig,
    credentials: &Credentials,
    now: DateTime<Utc>,
) -> Result<RunSummary, RunError> {
    let window = RunWindow::new(now, &config.pipeline);
    let batch = source.fetch(&window, credentials).await?;
    info!(
        operation = "fetch",
        invocations = batch.invocations.len(),
        traffic = batch.traffic.len(),
        "analytics fetched"
    );

    let path = Path::new(&config.output.path);
    let existing = read_snapshot(path).await;
    let stored_traffic = existing.as_ref().map_or(0, |s| s.traffic.len());

    let snapshot = build_snapshot(existing.as_ref(), &batch, now, &config.pipeline);
    write_snapshot(path, &snapshot).await?;

    let summary = RunSummary {
        invocations: snapshot.data.len(),
        fresh_traffic: batch.traffic.len(),
        merged_traffic: snapshot.traffic.len(),
        dropped_traffic: (stored_traffic + batch.traffic.len())
            .saturating_sub(snapshot.traffic.len()),
    };
    info!(
        operation = "write_snapshot",
        invocations = summary.invocations,
        stored_traffic,
        merged_traffic = summary.merged_traffic,
        dropped_traffic = summary.dropped_traffic,
        "snapshot updated"
    );
    Ok(summary)
}
