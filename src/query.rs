// GraphQL document and variables for one run.
// Shape of the document follows the flags in PipelineConfig; the API contract is fixed upstream.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde_json::{Value, json};

use crate::config::{Credentials, PipelineConfig};
use crate::models::format_instant;

/// Time bounds for a run, derived once from `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub since: DateTime<Utc>,
    pub traffic_since: DateTime<Utc>,
    pub month_start: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl RunWindow {
    pub fn new(now: DateTime<Utc>, config: &PipelineConfig) -> Self {
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now);
        Self {
            since: now - Duration::days(i64::from(config.window_days)),
            traffic_since: now - Duration::hours(i64::from(config.traffic_window_hours)),
            month_start,
            until: now,
        }
    }
}

pub fn build_query(config: &PipelineConfig) -> String {
    let mut params = vec![
        "$accountTag: string!",
        "$since: Time",
        "$until: Time",
    ];
    if config.include_usage_query {
        params.push("$monthStart: Time");
    }
    if config.include_traffic_query {
        params.push("$zoneTag: string!");
        params.push("$trafficSince: Time");
    }

    let cpu_time = if config.include_cpu_time {
        "\n          cpuTime"
    } else {
        ""
    };

    let mut q = format!(
        r#"query DashboardStats({params}) {{
  viewer {{
    accounts(filter: {{accountTag: $accountTag}}) {{
      workersInvocationsAdaptive(
        limit: {limit},
        filter: {{datetime_geq: $since, datetime_leq: $until}}
      ) {{
        sum {{
          requests
          errors{cpu_time}
        }}
        dimensions {{
          datetime
          scriptName
        }}
      }}"#,
        params = params.join(", "),
        limit = config.invocations_limit,
    );

    if config.include_usage_query {
        q.push_str(
            r#"
      usage: workersInvocationsAdaptiveGroups(
        limit: 1,
        filter: {datetime_geq: $monthStart}
      ) {
        sum {
          requests
        }
      }"#,
        );
    }
    q.push_str("\n    }");

    if config.include_traffic_query {
        q.push_str(&format!(
            r#"
    zones(filter: {{zoneTag: $zoneTag}}) {{
      httpRequestsAdaptiveGroups(
        limit: {limit},
        filter: {{datetime_geq: $trafficSince, datetime_leq: $until}},
        orderBy: [datetimeHour_ASC]
      ) {{
        sum {{
          edgeResponseBytes
        }}
        dimensions {{
          datetime: datetimeHour
        }}
      }}
    }}"#,
            limit = config.traffic_limit,
        ));
    }

    q.push_str("\n  }\n}\n");
    q
}

pub fn build_variables(
    window: &RunWindow,
    credentials: &Credentials,
    config: &PipelineConfig,
) -> Value {
    let mut vars = json!({
        "accountTag": credentials.account_id,
        "since": format_instant(window.since),
        "until": format_instant(window.until),
    });
    if config.include_usage_query {
        vars["monthStart"] = json!(format_instant(window.month_start));
    }
    if config.include_traffic_query {
        vars["zoneTag"] = json!(credentials.zone_id);
        vars["trafficSince"] = json!(format_instant(window.traffic_since));
    }
    vars
}
