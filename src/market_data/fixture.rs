use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use super::PriceSource;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{PricePoint, RawSeries};

/// In-memory price source keyed by symbol.
#[derive(Default)]
pub struct FixtureSource {
    series: HashMap<String, Vec<PricePoint>>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one close per calendar day starting at `start`.
    pub fn with_daily(mut self, symbol: &str, start: NaiveDate, closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + Duration::days(i as i64), c))
            .collect();
        self.series.insert(symbol.to_string(), points);
        self
    }
}

#[async_trait]
impl PriceSource for FixtureSource {
    async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> PipelineResult<RawSeries> {
        let points: Vec<PricePoint> = self
            .series
            .get(symbol)
            .map(|pts| {
                pts.iter()
                    .filter(|p| p.date >= start && p.date < end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();

        if points.is_empty() {
            return Err(PipelineError::unavailable(symbol, "fixture has no rows"));
        }
        Ok(RawSeries::new(symbol, points))
    }
}
