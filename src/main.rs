use std::sync::Arc;

use anyhow::Context;
use shiptivity::{
    api,
    config::ServerConfig,
    seed,
    storage::{sqlite_storage::SqliteStorage, Storage},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shiptivity=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid configuration")?;

    let storage = SqliteStorage::open(&config.db_path)
        .with_context(|| format!("failed to open database at {}", config.db_path.display()))?;
    storage.initialize().await.context("failed to create schema")?;
    storage
        .seed_if_empty(seed::seed_cards(), seed::seed_users())
        .await
        .context("failed to seed database")?;

    let app = api::build_router(Arc::new(storage));
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr()))?;
    tracing::info!(addr = %listener.local_addr()?, "shiptivity listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down cleanly");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM so the storage handle is released on both.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    }
    tracing::info!("shutdown signal received");
}
