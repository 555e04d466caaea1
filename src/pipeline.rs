// =============================================================================
// Pipeline — fetch → compute → build
// =============================================================================
//
// The single entry point shared by the `render` command and the web form.
// Input is validated before any network access; after that the only fallible
// step is the fetch.
// =============================================================================

use chrono::{Local, NaiveDate};
use tracing::{info, instrument, warn};

use crate::chart::{self, ChartSpec, Summary};
use crate::error::{PipelineError, PipelineResult};
use crate::indicators;
use crate::market_data::PriceSource;

const MAX_SYMBOL_LEN: usize = 32;

/// A validated (symbol, date range, title) request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub symbol: String,
    pub start_date: NaiveDate,
    /// Exclusive upper bound, fixed to the day the request was validated.
    pub end_date: NaiveDate,
    pub title: String,
}

impl ChartRequest {
    /// Validate raw form/config values against `today`.
    ///
    /// An empty title falls back to the symbol.
    pub fn parse(
        symbol: &str,
        start_date: &str,
        title: &str,
        today: NaiveDate,
    ) -> PipelineResult<Self> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(PipelineError::invalid("symbol must not be empty"));
        }
        if symbol.len() > MAX_SYMBOL_LEN {
            return Err(PipelineError::invalid(format!(
                "symbol is longer than {MAX_SYMBOL_LEN} characters"
            )));
        }
        if let Some(bad) = symbol
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '^' | '=')))
        {
            return Err(PipelineError::invalid(format!(
                "symbol contains unsupported character '{bad}'"
            )));
        }

        let start_raw = start_date.trim();
        let start_date = NaiveDate::parse_from_str(start_raw, "%Y-%m-%d").map_err(|_| {
            PipelineError::invalid(format!(
                "start date '{start_raw}' is not a YYYY-MM-DD calendar date"
            ))
        })?;
        if start_date > today {
            return Err(PipelineError::invalid(format!(
                "start date {start_date} is after today ({today})"
            )));
        }

        let title = match title.trim() {
            "" => symbol.to_string(),
            t => t.to_string(),
        };

        Ok(Self {
            symbol: symbol.to_string(),
            start_date,
            end_date: today,
            title,
        })
    }

    /// Validate against the local calendar date.
    pub fn parse_now(symbol: &str, start_date: &str, title: &str) -> PipelineResult<Self> {
        Self::parse(symbol, start_date, title, Local::now().date_naive())
    }
}

/// Fetch the series, derive the indicator and build the chart.
///
/// Fails only with `DataUnavailable` (from the source, or an empty series).
/// A series shorter than `window` is rendered with an empty indicator trace.
#[instrument(skip_all, fields(start = %request.start_date))]
pub async fn compute_and_build(
    source: &dyn PriceSource,
    request: &ChartRequest,
    window: usize,
) -> PipelineResult<(ChartSpec, Summary)> {
    let raw = source
        .fetch_daily(&request.symbol, request.start_date, request.end_date)
        .await?;

    if raw.is_empty() {
        return Err(PipelineError::unavailable(
            &request.symbol,
            "provider returned an empty series",
        ));
    }
    if raw.len() < window {
        warn!(
            symbol = %request.symbol,
            points = raw.len(),
            window, "series shorter than the moving-average window, indicator undefined"
        );
    }

    let derived = indicators::compute(&raw, window);
    let (spec, summary) = chart::build(&derived, &request.title);

    info!(
        symbol = %derived.symbol,
        window = derived.window,
        points = derived.len(),
        defined = derived.defined_count(),
        latest_indicator = ?summary.latest_indicator,
        latest_close = ?summary.latest_close,
        last_date = ?summary.last_date,
        "chart built"
    );

    Ok((spec, summary))
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::DEFAULT_WINDOW;
    use crate::market_data::fixture::FixtureSource;
    use crate::types::RawSeries;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn today() -> NaiveDate {
        d(2026, 10, 18)
    }

    /// Source that always returns an empty series and counts calls.
    #[derive(Default)]
    struct EmptySource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for EmptySource {
        async fn fetch_daily(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> PipelineResult<RawSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawSeries::new(symbol, Vec::new()))
        }
    }

    // ---- ChartRequest::parse ---------------------------------------------

    #[test]
    fn parse_valid_request() {
        let req = ChartRequest::parse(" BTC-USD ", "2010-01-01", "Bitcoin", today()).unwrap();
        assert_eq!(req.symbol, "BTC-USD");
        assert_eq!(req.start_date, d(2010, 1, 1));
        assert_eq!(req.end_date, today());
        assert_eq!(req.title, "Bitcoin");
    }

    #[test]
    fn parse_empty_title_falls_back_to_symbol() {
        let req = ChartRequest::parse("^GSPC", "2020-01-01", "  ", today()).unwrap();
        assert_eq!(req.title, "^GSPC");
    }

    #[test]
    fn parse_rejects_empty_symbol() {
        let err = ChartRequest::parse("   ", "2020-01-01", "x", today()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn parse_rejects_bad_symbol_chars() {
        let err = ChartRequest::parse("BTC/USD", "2020-01-01", "x", today()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(msg) if msg.contains('/')));
    }

    #[test]
    fn parse_rejects_malformed_date() {
        for bad in ["2020-13-01", "01/02/2020", "", "2020-02-30"] {
            let err = ChartRequest::parse("BTC-USD", bad, "x", today()).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidInput(_)), "{bad}");
        }
    }

    #[test]
    fn parse_rejects_future_start() {
        let err = ChartRequest::parse("BTC-USD", "2026-10-19", "x", today()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    // ---- compute_and_build -----------------------------------------------

    #[tokio::test]
    async fn builds_chart_from_source() {
        let closes: Vec<f64> = (0..250).map(|i| 100.0 + i as f64).collect();
        let start = d(2025, 1, 1);
        let source = FixtureSource::new().with_daily("BTC-USD", start, &closes);
        let req = ChartRequest::parse("BTC-USD", "2025-01-01", "Bitcoin", today()).unwrap();

        let (spec, summary) = compute_and_build(&source, &req, DEFAULT_WINDOW).await.unwrap();
        assert_eq!(spec.data[0].y.len(), 250);
        assert_eq!(spec.data[0].y.iter().filter(|v| v.is_some()).count(), 51);
        assert_eq!(summary.latest_close, Some(349.0));
        let expected = (349.0 - 249.5) / 249.5;
        assert!((summary.latest_indicator.unwrap() - expected).abs() < 1e-12);
    }

    #[tokio::test]
    async fn empty_series_is_data_unavailable() {
        let source = EmptySource::default();
        let req = ChartRequest::parse("NOPE", "2020-01-01", "x", today()).unwrap();
        let err = compute_and_build(&source, &req, DEFAULT_WINDOW).await.unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable { ref symbol, .. } if symbol == "NOPE"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_symbol_propagates_source_error() {
        let source = FixtureSource::new();
        let req = ChartRequest::parse("ZZZ", "2020-01-01", "x", today()).unwrap();
        let err = compute_and_build(&source, &req, DEFAULT_WINDOW).await.unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn single_point_still_renders() {
        let source = FixtureSource::new().with_daily("ETH-USD", d(2026, 1, 1), &[3000.0]);
        let req = ChartRequest::parse("ETH-USD", "2026-01-01", "Ethereum", today()).unwrap();
        let (spec, summary) = compute_and_build(&source, &req, DEFAULT_WINDOW).await.unwrap();
        assert_eq!(spec.data[0].y, vec![None]);
        assert_eq!(spec.data[1].y, vec![Some(3000.0)]);
        assert!(summary.latest_indicator.is_none());
    }
}
