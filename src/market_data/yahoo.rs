// =============================================================================
// Yahoo Finance Chart API Client — daily close history
// =============================================================================
//
// GET {base_url}/{symbol}?period1=<unix>&period2=<unix>&interval=1d
//
// `period2` is exclusive: a request ending "today" returns settled bars up to
// yesterday. Timestamps are exchange-local session opens; adding the
// response's `gmtoffset` before truncating gives the trading date.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::PriceSource;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{PricePoint, RawSeries};

/// Public chart endpoint; the symbol is appended as a path segment.
pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) ahr999-chart/1.0";

// ---------------------------------------------------------------------------
// Response shapes (only the fields we read)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    // Absent entirely when the range holds no bars.
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Yahoo Finance chart client. One HTTP request per fetch, no retry.
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a client against `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client")?;

        debug!(%base_url, ?timeout, "YahooClient initialised");

        Ok(Self { base_url, client })
    }

    /// Build the chart URL, encoding `symbol` as a single path segment.
    fn chart_url(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid provider base url '{}'", self.base_url))?;

        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("provider base url cannot take path segments"))?
            .pop_if_empty()
            .push(symbol);

        url.query_pairs_mut()
            .append_pair("period1", &midnight_utc(start).to_string())
            .append_pair("period2", &midnight_utc(end).to_string())
            .append_pair("interval", "1d");

        Ok(url)
    }

    async fn fetch_rows(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        let url = self.chart_url(symbol, start, end)?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("GET chart request failed")?;

        let status = resp.status();
        let body = resp.text().await.context("failed to read chart response")?;

        // Unknown symbols come back as 404 with a structured `chart.error`,
        // so parse before looking at the status.
        match parse_chart(&body) {
            Ok(rows) if status.is_success() => Ok(rows),
            Ok(_) => anyhow::bail!("Yahoo chart returned {status}"),
            Err(e) if !status.is_success() => Err(e.context(format!("Yahoo chart returned {status}"))),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    #[instrument(skip(self), name = "yahoo::fetch_daily")]
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PipelineResult<RawSeries> {
        let rows = self.fetch_rows(symbol, start, end).await.map_err(|e| {
            warn!(symbol, error = %e, "price fetch failed");
            PipelineError::unavailable(symbol, format!("{e:#}"))
        })?;

        if rows.is_empty() {
            warn!(symbol, %start, %end, "provider returned no rows");
            return Err(PipelineError::unavailable(
                symbol,
                "provider returned no rows for the requested range",
            ));
        }

        let series = RawSeries::from_unordered(symbol, rows);
        debug!(symbol, count = series.len(), "daily closes fetched");
        Ok(series)
    }
}

impl std::fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Parse a chart response body into dated closes (provider order).
///
/// Rows whose close is null, non-finite or non-positive are dropped.
fn parse_chart(body: &str) -> Result<Vec<PricePoint>> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).context("failed to parse chart response")?;

    if let Some(err) = envelope.chart.error {
        anyhow::bail!("provider error [{}]: {}", err.code, err.description);
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    if closes.len() != result.timestamp.len() {
        warn!(
            timestamps = result.timestamp.len(),
            closes = closes.len(),
            "chart columns differ in length, truncating to the shorter"
        );
    }

    let offset = result.meta.gmtoffset;
    let mut rows = Vec::with_capacity(closes.len());
    for (&ts, close) in result.timestamp.iter().zip(closes) {
        let Some(close) = close.filter(|c| c.is_finite() && *c > 0.0) else {
            debug!(ts, "skipping bar without a usable close");
            continue;
        };
        let date = DateTime::from_timestamp(ts + offset, 0)
            .with_context(|| format!("timestamp {ts} out of range"))?
            .date_naive();
        rows.push(PricePoint::new(date, close));
    }

    Ok(rows)
}
