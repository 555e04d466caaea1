// =============================================================================
// AHR999 Chart — Main Entry Point
// =============================================================================
//
//   ahr999-chart [serve]   web form on the configured host/port (default)
//   ahr999-chart render    render the configured targets to HTML and print
//                          their summaries
//
// Configuration comes from `AHR_CONFIG` (default `ahr999_config.json`) with
// environment overrides; a missing file falls back to defaults.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod chart;
mod config;
mod error;
mod indicators;
mod market_data;
mod pipeline;
mod render;
mod server;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use crate::market_data::{PriceSource, YahooClient};
use crate::server::Server;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Serve,
    Render,
}

impl Mode {
    fn from_arg(arg: Option<&str>) -> anyhow::Result<Self> {
        match arg {
            None | Some("serve") => Ok(Self::Serve),
            Some("render") => Ok(Self::Render),
            Some(other) => anyhow::bail!("unknown command '{other}' (expected 'serve' or 'render')"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    config.apply_env_overrides()?;

    let default_level = if config.server.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Logged only now that the subscriber exists.
    if let Some(e) = load_error {
        warn!(path = %config_path, error = %format!("{e:#}"), "Failed to load config, using defaults");
    }
    config.validate().context("invalid configuration")?;

    let arg = std::env::args().nth(1);
    let mode = Mode::from_arg(arg.as_deref())?;
    info!(?mode, window = config.window, "AHR999 chart starting");

    // ── 2. Price source ──────────────────────────────────────────────────
    let source: Arc<dyn PriceSource> = Arc::new(YahooClient::new(
        config.provider_base_url.clone(),
        config.request_timeout(),
    )?);

    // ── 3. Run ───────────────────────────────────────────────────────────
    match mode {
        Mode::Render => render::render_all(&config, source.as_ref()).await,
        Mode::Serve => Server::new(&config, source).serve().await,
    }
}
