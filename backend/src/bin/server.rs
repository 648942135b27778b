//! Cycle prediction HTTP server.
//!
//! Resolves configuration, opens the repository, wires the prediction service
//! and serves the JSON API.
//!
//! # Usage
//!
//! ```bash
//! # SQLite file in the working directory (default)
//! cargo run --bin cycle-server
//!
//! # In-memory repository, narrative service enabled
//! REPOSITORY_TYPE=local OPENAI_API_KEY=sk-... cargo run --bin cycle-server
//! ```
//!
//! See [`cycle_predictor::config`] for every environment variable.
//! `RUST_LOG` controls log filtering (default: info).

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cycle_predictor::config::AppConfig;
use cycle_predictor::db::RepositoryFactory;
use cycle_predictor::http::{create_router, AppState};
use cycle_predictor::models::time::SystemClock;
use cycle_predictor::services::{OpenAiNarrator, PredictionService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting cycle prediction server");

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!("Configuration resolved: {:?}", config);

    let repository = RepositoryFactory::from_config(&config.storage)
        .await
        .context("Failed to initialize repository")?;
    info!("Repository initialized successfully");

    if config.narrative.api_key.is_none() {
        warn!("OPENAI_API_KEY not set; predictions will use fallback text");
    }
    let narrator = OpenAiNarrator::new(config.narrative.clone())
        .context("Failed to build narrative client")?;

    let predictor = PredictionService::from_config(
        &config,
        repository.clone(),
        Arc::new(narrator),
        Arc::new(SystemClock),
    );

    let state = AppState::new(repository, Arc::new(predictor));
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
