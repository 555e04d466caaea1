// =============================================================================
// Data Source Adapter
// =============================================================================
//
// A `PriceSource` turns (symbol, start, end) into a `RawSeries`. The live
// implementation is `YahooClient`; tests substitute an in-memory fixture.

#[cfg(test)]
pub mod fixture;
pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::PipelineResult;
use crate::types::RawSeries;

pub use yahoo::YahooClient;

/// Upstream provider of daily closing prices.
///
/// Implementations perform at most one fetch per call and never cache.
/// Any failure, including an empty result, surfaces as
/// [`PipelineError::DataUnavailable`](crate::error::PipelineError).
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch daily closes for `symbol` in `[start, end)`, ordered ascending.
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PipelineResult<RawSeries>;
}
