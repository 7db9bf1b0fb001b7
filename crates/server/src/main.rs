//! ladder-server entry point.
//!
//! Boots the leaderboard cache HTTP server. Logs are JSON on stderr.

use anyhow::{Context, Result};
use ladder_client::{RiotClient, RiotConfig};
use ladder_core::{AppConfig, CacheDb, CachePolicy, LeaderboardCache};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;

    if let Some(parent) = config.db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory {}", parent.display()))?;
    }

    let db = CacheDb::open(&config.db_path).await?;
    let client = RiotClient::new(RiotConfig::from_app_config(&config)?)?;
    let policy = CachePolicy::from_config(&config);
    let cache = LeaderboardCache::new(Arc::new(db), Arc::new(client), policy);

    let app = handler::router(handler::AppState::new(cache));
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;

    tracing::info!(
        addr = %config.bind_addr,
        ttl_secs = config.ttl_secs,
        max_stale_secs = policy.max_stale.num_seconds(),
        "ladder-server listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("ladder-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
