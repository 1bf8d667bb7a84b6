use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use viewer_server::config::Config;
use viewer_server::store::GameStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();
    let store = Arc::new(GameStore::new());

    if let Some(dir) = &config.pgn_dir {
        tracing::info!("Preloading PGN files from {}", dir.display());
        match store.preload_dir(dir) {
            Ok(0) => tracing::warn!("No playable .pgn files in {}", dir.display()),
            Ok(n) => tracing::info!("Preloaded {n} libraries"),
            Err(e) => tracing::warn!("Failed to preload {}: {e}", dir.display()),
        }
    }

    let addr = format!("{}:{}", config.host, config.port);
    let app = viewer_server::build_router(store, config);

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
