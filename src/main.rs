use std::net::SocketAddr;

use anyhow::Context;
use project_timeline::{
    AppConfig, AppState, FileKeyValueStore, PersistenceAdapter, TimelineStore, build_router,
};

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TIMELINE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.log_level)?;

    let medium = FileKeyValueStore::new(&config.data_dir);
    let store = TimelineStore::open(PersistenceAdapter::new(medium, config.seed_sample_data));
    let state = AppState::new(store);
    let app = build_router(state.clone(), &config.static_dir);

    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.bind_addr))?;

    // Print the link to the server
    println!("  Server running at http://{}", addr);
    println!("  Static files: http://{}/", addr);
    println!("  API base:     http://{}/api", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // The router (and its state clone) is gone once serve returns.
    match std::sync::Arc::try_unwrap(state.store) {
        Ok(store) => store.into_inner().close(),
        Err(_) => tracing::warn!("store still shared at shutdown, skipping final flush"),
    }
    Ok(())
}
