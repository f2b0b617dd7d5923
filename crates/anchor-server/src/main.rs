use anchor_server::{app, config, state};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = config::load_config().context("failed to load server config")?;
    let state = Arc::new(state::AppState::init(&cfg)?);
    let sweeper = state::spawn_sweeper(state.clone());

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind).await?;
    tracing::info!("anchor-server listening on {}", cfg.server.bind);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutting down");
}
