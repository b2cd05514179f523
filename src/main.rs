use std::process::ExitCode;

use api::{AppConfig, AppError, AppState};
use tracing::{Level, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Optional: real deployments pass variables directly.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(ai_llm_service::telemetry::env_filter_with_level(
            "info",
            Level::INFO,
        ))
        .with(ai_llm_service::telemetry::layer())
        .init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded .env");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let cfg = AppConfig::from_env()?;
    let address = cfg.address.clone();
    let state = AppState::build(cfg).await?;
    api::start(state, &address).await
}
