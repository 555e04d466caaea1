// =============================================================================
// Web Form Endpoints — Axum 0.7
// =============================================================================
//
//   GET  /        form page (symbol, start_date, title)
//   POST /plot    urlencoded form → page with the embedded chart
//   GET  /health  liveness probe
//
// Pipeline failures become HTML error pages: bad input is a 400, missing
// upstream data a 502.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api::pages;
use crate::app_state::AppState;
use crate::chart::html::render_fragment;
use crate::error::PipelineError;
use crate::pipeline::{self, ChartRequest};

// =============================================================================
// Router construction
// =============================================================================

/// Build the router with request tracing and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/plot", post(plot))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

// =============================================================================
// Error mapping
// =============================================================================

/// Everything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    Pipeline(PipelineError),
    Render(String),
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        Self::Pipeline(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, heading, detail) = match self {
            Self::Pipeline(e @ PipelineError::InvalidInput(_)) => {
                warn!(error = %e, "rejected plot request");
                (StatusCode::BAD_REQUEST, "Invalid input", e.to_string())
            }
            Self::Pipeline(e @ PipelineError::DataUnavailable { .. }) => {
                warn!(error = %e, "no data for plot request");
                (StatusCode::BAD_GATEWAY, "Data unavailable", e.to_string())
            }
            Self::Render(msg) => {
                error!(error = %msg, "failed to render chart");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Rendering failed",
                    msg,
                )
            }
        };
        (status, Html(pages::error_page(heading, &detail))).into_response()
    }
}

// =============================================================================
// Form page
// =============================================================================

async fn index() -> Html<String> {
    Html(pages::form_page())
}

// =============================================================================
// Plot
// =============================================================================

/// Missing fields default to empty so validation reports them uniformly.
#[derive(Debug, Deserialize)]
struct PlotForm {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    title: String,
}

async fn plot(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PlotForm>,
) -> Result<Html<String>, ApiError> {
    let request = ChartRequest::parse_now(&form.symbol, &form.start_date, &form.title)?;
    info!(symbol = %request.symbol, start = %request.start_date, "plot requested");

    let (spec, summary) =
        pipeline::compute_and_build(state.source.as_ref(), &request, state.window).await?;

    let fragment = render_fragment(&spec).map_err(|e| ApiError::Render(e.to_string()))?;
    Ok(Html(pages::plot_page(&summary, &fragment, &state.plotly_cdn_url)))
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}
