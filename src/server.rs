// =============================================================================
// Web Server — explicitly constructed, injected configuration
// =============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api;
use crate::app_state::AppState;
use crate::config::{AppConfig, ServerConfig};
use crate::market_data::PriceSource;

/// The web form shell. Construct once at startup, then `serve`.
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    pub fn new(config: &AppConfig, source: Arc<dyn PriceSource>) -> Self {
        Self {
            config: config.server.clone(),
            state: Arc::new(AppState::new(config, source)),
        }
    }

    /// Bind and serve until Ctrl-C.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;

        info!(addr = %addr, debug = self.config.debug, "web server listening");

        axum::serve(listener, api::rest::router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("web server failed")?;

        info!("web server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        // Without a signal handler, keep serving rather than exit at once.
        std::future::pending::<()>().await;
    }
    warn!("shutdown signal received, stopping gracefully");
}
