use std::sync::Arc;

use anyhow::Result;
use tokio::sync::broadcast;
use tracing::info;

use super::{router, AppState};
use crate::config::ServerConfig;

/// HTTP server for the daemon.
pub struct HttpServer {
    addr: String,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, state: Arc<AppState>) -> Self {
        Self {
            addr: format!("{}:{}", config.http.host, config.http.port),
            state,
        }
    }

    /// Run until the shutdown channel fires.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        let app = router::build_router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        info!("HTTP server listening on {}", self.addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("HTTP server shutting down");
            })
            .await?;

        Ok(())
    }
}
