use serde::Deserialize;

use crate::error::RunError;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.cloudflare.com/client/v4/graphql".into(),
            timeout_secs: 30,
        }
    }
}

/// Which queries a run issues and how much history it keeps.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fetch hourly zone egress and accumulate it into `traffic`. Needs `CF_ZONE_ID`.
    pub include_traffic_query: bool,
    pub include_cpu_time: bool,
    /// Month-to-date request total, written as `usage`.
    pub include_usage_query: bool,
    pub retention_days: u32,
    /// Invocation window; `data` always holds exactly this window.
    pub window_days: u32,
    /// Traffic window per call. Older buckets come from the saved snapshot.
    pub traffic_window_hours: u32,
    pub invocations_limit: u32,
    pub traffic_limit: u32,
    /// Plan request quota reported alongside `usage`.
    pub monthly_request_limit: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            include_traffic_query: false,
            include_cpu_time: false,
            include_usage_query: false,
            retention_days: 35,
            window_days: 7,
            traffic_window_hours: 24,
            invocations_limit: 100,
            traffic_limit: 1000,
            monthly_request_limit: 100_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "public/data.json".into(),
        }
    }
}

impl AppConfig {
    /// Load from `CONFIG_FILE`, or `config.toml`. A missing default file means built-in defaults;
    /// a missing explicit `CONFIG_FILE` is an error.
    pub fn load() -> anyhow::Result<Self> {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => {
                let s = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("reading {}: {}", path, e))?;
                Self::load_from_str(&s)
            }
            Err(_) => match std::fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(s) => Self::load_from_str(&s),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    let config = AppConfig::default();
                    config.validate()?;
                    Ok(config)
                }
                Err(e) => Err(anyhow::anyhow!("reading {}: {}", DEFAULT_CONFIG_PATH, e)),
            },
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.api.endpoint.trim().is_empty(),
            "api.endpoint must be non-empty"
        );
        anyhow::ensure!(
            self.api.timeout_secs > 0,
            "api.timeout_secs must be > 0, got {}",
            self.api.timeout_secs
        );
        anyhow::ensure!(
            self.pipeline.retention_days > 0,
            "pipeline.retention_days must be > 0, got {}",
            self.pipeline.retention_days
        );
        anyhow::ensure!(
            self.pipeline.window_days > 0,
            "pipeline.window_days must be > 0, got {}",
            self.pipeline.window_days
        );
        anyhow::ensure!(
            self.pipeline.traffic_window_hours > 0,
            "pipeline.traffic_window_hours must be > 0, got {}",
            self.pipeline.traffic_window_hours
        );
        anyhow::ensure!(
            u64::from(self.pipeline.traffic_window_hours)
                <= u64::from(self.pipeline.retention_days) * 24,
            "pipeline.traffic_window_hours ({}) must not exceed retention_days * 24 ({})",
            self.pipeline.traffic_window_hours,
            u64::from(self.pipeline.retention_days) * 24
        );
        anyhow::ensure!(
            self.pipeline.invocations_limit > 0,
            "pipeline.invocations_limit must be > 0, got {}",
            self.pipeline.invocations_limit
        );
        anyhow::ensure!(
            self.pipeline.traffic_limit > 0,
            "pipeline.traffic_limit must be > 0, got {}",
            self.pipeline.traffic_limit
        );
        anyhow::ensure!(
            !self.output.path.trim().is_empty(),
            "output.path must be non-empty"
        );
        Ok(())
    }
}

/// API identifiers and token, taken from the environment only.
#[derive(Clone)]
pub struct Credentials {
    pub account_id: String,
    pub api_token: String,
    pub zone_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .field("zone_id", &self.zone_id)
            .finish()
    }
}

impl Credentials {
    /// Read `CF_ACCOUNT_ID`, `CF_API_TOKEN` and, when traffic is queried, `CF_ZONE_ID`.
    pub fn from_env(pipeline: &PipelineConfig) -> Result<Self, RunError> {
        Self::from_lookup(pipeline, |key| std::env::var(key).ok())
    }

    /// Same as [`Credentials::from_env`] with an injectable lookup (for tests).
    pub fn from_lookup<F>(pipeline: &PipelineConfig, lookup: F) -> Result<Self, RunError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| RunError::Configuration(format!("{key} is not set")))
        };
        let account_id = required("CF_ACCOUNT_ID")?;
        let api_token = required("CF_API_TOKEN")?;
        let zone_id = if pipeline.include_traffic_query {
            Some(required("CF_ZONE_ID")?)
        } else {
            None
        };
        Ok(Self {
            account_id,
            api_token,
            zone_id,
        })
    }
}
