use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use assay_server::api;
use assay_server::collab::{DirectoryContextProvider, http_stages};
use assay_server::config::Config;
use assay_server::driver::JobDriver;
use assay_server::pipeline::Pipeline;
use assay_server::state::{AppState, SubmissionLimits};
use assay_server::store::JobStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Per-request ceiling for calls to the analysis service
const ANALYSIS_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "assay_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Assay server...");

    let config = Config::from_env()?;
    config.validate()?;
    tracing::debug!("Configuration: {:?}", config);

    let store = Arc::new(JobStore::new(config.job_ttl));
    let sweeper = store.spawn_sweeper(config.sweep_interval);

    let http = reqwest::Client::builder()
        .timeout(ANALYSIS_REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let pipeline = Pipeline::new(
        http_stages(http, &config.analysis_url),
        Arc::new(DirectoryContextProvider::new(config.guidance_dir.clone())),
    )?
    .with_guideline_version(&config.guideline_version);

    tracing::info!(
        "Pipeline ready: {} stage(s), guidance from {}, analysis at {}",
        pipeline.stage_ids().len(),
        config.guidance_dir.display(),
        config.analysis_url
    );

    let driver = JobDriver::new(
        Arc::clone(&store),
        Arc::new(pipeline),
        config.pipeline_timeout,
    );
    let state = AppState::new(driver, SubmissionLimits::from(&config), config.poll_interval);

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    tracing::info!("Assay server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
