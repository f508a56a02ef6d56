use anyhow::Context;
use db::DBService;
use server::{AppState, build_router, config::ServerConfig};
use tokio::net::TcpListener;
use tracing::info;
use utils::logging::{DEFAULT_LOG_FILTER, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    init_tracing(DEFAULT_LOG_FILTER);

    let config = ServerConfig::from_env()?;
    let db = DBService::new(&config.database_url, config.db_max_connections)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    let app = build_router(AppState::new(db));

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    info!(bind_addr = %config.bind_addr, "Entmoot server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
