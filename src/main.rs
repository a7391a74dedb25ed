use std::process::ExitCode;

use cfstats::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    tracing::info!(version = version::VERSION, "{} starting", version::NAME);

    let app_config = match config::AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, operation = "load_config", "invalid configuration");
            return ExitCode::from(2);
        }
    };

    match run(&app_config).await {
        Ok(summary) => {
            tracing::info!(
                invocations = summary.invocations,
                traffic = summary.merged_traffic,
                "run complete; data saved to {}",
                app_config.output.path
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "run failed; previous snapshot left untouched");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(app_config: &config::AppConfig) -> Result<pipeline::RunSummary, error::RunError> {
    let credentials = config::Credentials::from_env(&app_config.pipeline)?;
    let client = analytics::GraphqlClient::new(&app_config.api, &app_config.pipeline)?;
    pipeline::run_once(&client, app_config, &credentials, chrono::Utc::now()).await
}
