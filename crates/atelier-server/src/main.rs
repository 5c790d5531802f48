use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use atelier_core::Engine;
use atelier_server::config::ServerConfig;
use atelier_server::http::{AppState, HttpServer};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("atelier=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::load()?;
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let db_path = data_dir.join("atelier.db");
    let conn = atelier_db::open(&db_path)?;
    info!("Database ready at {:?}", db_path);

    let store = atelier_core::store(conn);
    let state = Arc::new(AppState {
        engine: Engine::new(store.clone()),
        store,
        public_base_url: config
            .sharing
            .public_base_url
            .trim_end_matches('/')
            .to_string(),
        resolve_timeout: Duration::from_millis(config.sharing.resolve_timeout_ms),
    });

    let (shutdown_tx, _) = broadcast::channel(1);
    let server = HttpServer::new(&config, state);
    let server_task = tokio::spawn({
        let shutdown_rx = shutdown_tx.subscribe();
        async move { server.run(shutdown_rx).await }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    let _ = shutdown_tx.send(());
    server_task.await??;

    Ok(())
}
