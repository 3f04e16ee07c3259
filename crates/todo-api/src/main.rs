//! todo-api バイナリのエントリポイント

use infrastructure::{Database, SqliteTodoRepository, SqliteUserRepository};
use shared::{init_tracing, Config, TokenIssuer};
use std::sync::Arc;
use todo_api::{app_with_state, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().map_err(|e| anyhow::anyhow!(e))?;

    let config = Config::from_env()?;
    let db = Database::connect(&config.database_url).await?;

    let state = AppState::new(
        Arc::new(SqliteTodoRepository::new(&db)),
        Arc::new(SqliteUserRepository::new(&db)),
        TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl_secs),
    );

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = %config.environment, "server starting");

    axum::serve(listener, app_with_state(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
