// =============================================================================
// Application State — shared, read-only, per server instance
// =============================================================================
//
// Built once when the server is constructed and handed to every request via
// `Arc<AppState>`. Nothing here is mutated after construction, so requests
// share no mutable state and need no locks; every request fetches and owns
// its own series.
// =============================================================================

use std::sync::Arc;

use crate::config::AppConfig;
use crate::market_data::PriceSource;

pub struct AppState {
    /// Upstream price provider.
    pub source: Arc<dyn PriceSource>,
    /// Moving-average look-back.
    pub window: usize,
    /// Plotly.js bundle referenced by chart pages.
    pub plotly_cdn_url: String,
}

impl AppState {
    pub fn new(config: &AppConfig, source: Arc<dyn PriceSource>) -> Self {
        Self {
            source,
            window: config.window,
            plotly_cdn_url: config.plotly_cdn_url.clone(),
        }
    }
}
