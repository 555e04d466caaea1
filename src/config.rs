// =============================================================================
// Application Configuration — JSON file + environment overrides
// =============================================================================
//
// Every field carries a serde default so an empty `{}` (or a missing file)
// yields a working configuration. Environment variables (optionally from a
// `.env` file) override the file for the values most often changed per
// deployment.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::DEFAULT_WINDOW;
use crate::market_data::yahoo::DEFAULT_BASE_URL;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "AHR_CONFIG";
/// Config file used when `AHR_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "ahr999_config.json";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_provider_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_plotly_cdn_url() -> String {
    "https://cdn.plot.ly/plotly-2.35.2.min.js".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("charts")
}

fn default_open_browser() -> bool {
    true
}

fn default_targets() -> Vec<ChartTarget> {
    vec![
        ChartTarget {
            symbol: "BTC-USD".to_string(),
            start_date: "2010-01-01".to_string(),
            title: "Bitcoin".to_string(),
        },
        ChartTarget {
            symbol: "ETH-USD".to_string(),
            start_date: "2015-08-07".to_string(),
            title: "Ethereum".to_string(),
        },
    ]
}

// =============================================================================
// ServerConfig
// =============================================================================

/// Listen address and verbosity for the web form shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Raises the default log level to `debug`.
    #[serde(default)]
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
        }
    }
}

impl ServerConfig {
    /// `host:port`, resolved by the listener (host names are allowed).
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// ChartTarget
// =============================================================================

/// One (symbol, start date, title) triple rendered by the `render` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTarget {
    pub symbol: String,
    pub start_date: String,
    pub title: String,
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// Moving-average look-back in trading periods.
    #[serde(default = "default_window")]
    pub window: usize,

    /// Yahoo Finance chart endpoint.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    /// Per-request timeout for the price fetch.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Plotly.js bundle referenced by generated pages.
    #[serde(default = "default_plotly_cdn_url")]
    pub plotly_cdn_url: String,

    /// Directory that `render` writes standalone HTML charts into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Open each page written by `render` in the default browser.
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,

    /// Charts produced by `render`.
    #[serde(default = "default_targets")]
    pub targets: Vec<ChartTarget>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            window: default_window(),
            provider_base_url: default_provider_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            plotly_cdn_url: default_plotly_cdn_url(),
            output_dir: default_output_dir(),
            open_browser: default_open_browser(),
            targets: default_targets(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            window = config.window,
            targets = config.targets.len(),
            "config loaded"
        );

        Ok(config)
    }

    /// Apply `AHR_HOST`, `AHR_PORT`, `AHR_DEBUG`, `AHR_OUTPUT_DIR` and
    /// `AHR_OPEN_BROWSER`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = lookup("AHR_HOST") {
            self.server.host = host.trim().to_string();
        }
        if let Some(port) = lookup("AHR_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("AHR_PORT is not a valid port: '{port}'"))?;
        }
        if let Some(debug) = lookup("AHR_DEBUG") {
            self.server.debug = is_truthy(&debug);
        }
        if let Some(dir) = lookup("AHR_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir.trim());
        }
        if let Some(open) = lookup("AHR_OPEN_BROWSER") {
            self.open_browser = is_truthy(&open);
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            anyhow::bail!("window must be at least 1");
        }
        if self.server.host.is_empty() {
            anyhow::bail!("server.host must not be empty");
        }
        if self.server.port == 0 {
            anyhow::bail!("server.port must not be 0");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
