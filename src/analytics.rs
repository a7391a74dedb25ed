// Fetch side of a run: the AnalyticsSource seam and its GraphQL-over-HTTP implementation.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::config::{ApiConfig, Credentials, PipelineConfig};
use crate::error::RunError;
use crate::models::{InvocationRecord, TrafficRecord};
use crate::query::{RunWindow, build_query, build_variables};
use crate::version;

/// Everything one fetch returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedBatch {
    pub invocations: Vec<InvocationRecord>,
    /// Empty when the traffic query is disabled.
    pub traffic: Vec<TrafficRecord>,
    /// Month-to-date requests; `None` when the usage query is disabled.
    pub usage_requests: Option<u64>,
}

/// Source of fresh analytics rows for a time window.
pub trait AnalyticsSource {
    fn fetch(
        &self,
        window: &RunWindow,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<FetchedBatch, RunError>> + Send;
}

pub struct GraphqlClient {
    client: reqwest::Client,
    endpoint: String,
    pipeline: PipelineConfig,
}

impl GraphqlClient {
    pub fn new(api: &ApiConfig, pipeline: &PipelineConfig) -> Result<Self, RunError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(version::user_agent())
            .build()?;
        Ok(Self {
            client,
            endpoint: api.endpoint.clone(),
            pipeline: pipeline.clone(),
        })
    }
}

impl AnalyticsSource for GraphqlClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn fetch(
        &self,
        window: &RunWindow,
        credentials: &Credentials,
    ) -> Result<FetchedBatch, RunError> {
        let payload = json!({
            "query": build_query(&self.pipeline),
            "variables": build_variables(window, credentials, &self.pipeline),
        });
        debug!(
            operation = "graphql_query",
            traffic = self.pipeline.include_traffic_query,
            usage = self.pipeline.include_usage_query,
            "sending analytics query"
        );

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&credentials.api_token)
            .json(&payload)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            // A non-2xx body may still carry a GraphQL error list.
            if let Ok(parsed) = serde_json::from_str::<GraphqlResponse>(&body)
                && let Some(messages) = parsed.error_messages()
            {
                return Err(RunError::Remote(messages));
            }
            return Err(RunError::HttpStatus {
                status: status.as_u16(),
                body: truncate(&body, 512),
            });
        }

        parse_response(&body, &self.pipeline)
    }
}

/// Map a GraphQL response body to a batch, applying the error policy.
pub fn parse_response(body: &str, pipeline: &PipelineConfig) -> Result<FetchedBatch, RunError> {
    let parsed: GraphqlResponse = serde_json::from_str(body)
        .map_err(|e| RunError::Remote(vec![format!("unparseable response: {e}")]))?;

    if let Some(messages) = parsed.error_messages() {
        return Err(RunError::Remote(messages));
    }
    let Some(viewer) = parsed.data.and_then(|d| d.viewer) else {
        return Err(RunError::Remote(vec!["response data is null".into()]));
    };

    let mut accounts = viewer.accounts.into_iter();
    let Some(account) = accounts.next() else {
        return Err(RunError::EmptyResult("account"));
    };

    let traffic = if pipeline.include_traffic_query {
        let Some(zone) = viewer.zones.into_iter().next() else {
            return Err(RunError::EmptyResult("zone"));
        };
        zone.http_requests_adaptive_groups
    } else {
        Vec::new()
    };

    let usage_requests = if pipeline.include_usage_query {
        Some(account.usage.iter().map(|g| g.sum.requests).sum())
    } else {
        None
    };

    Ok(FetchedBatch {
        invocations: account.workers_invocations_adaptive,
        traffic,
        usage_requests,
    })
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

impl GraphqlResponse {
    fn error_messages(&self) -> Option<Vec<String>> {
        self.errors
            .as_ref()
            .filter(|errs| !errs.is_empty())
            .map(|errs| errs.iter().map(|e| e.message.clone()).collect())
    }
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(default)]
    viewer: Option<Viewer>,
}

#[derive(Debug, Deserialize)]
struct Viewer {
    #[serde(default)]
    accounts: Vec<AccountData>,
    #[serde(default)]
    zones: Vec<ZoneData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountData {
    #[serde(default)]
    workers_invocations_adaptive: Vec<InvocationRecord>,
    #[serde(default)]
    usage: Vec<UsageGroup>,
}

#[derive(Debug, Deserialize)]
struct UsageGroup {
    #[serde(default)]
    sum: UsageSum,
}

#[derive(Debug, Default, Deserialize)]
struct UsageSum {
    #[serde(default)]
    requests: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZoneData {
    #[serde(default)]
    http_requests_adaptive_groups: Vec<TrafficRecord>,
}
