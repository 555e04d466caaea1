// =============================================================================
// Shared series types used across the AHR999 chart pipeline
// =============================================================================

use chrono::NaiveDate;

/// One closing price for one trading period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Raw daily history for a single symbol, ordered by date ascending with
/// unique dates. Owned by exactly one pipeline invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSeries {
    pub symbol: String,
    points: Vec<PricePoint>,
}

impl RawSeries {
    /// Wrap points that are already ordered and de-duplicated.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// Build a series from provider rows in arbitrary order.
    ///
    /// Rows are sorted by date; when two rows share a date the later row in
    /// the input wins (providers append the live bar after the settled one).
    pub fn from_unordered(symbol: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        // Stable sort keeps input order among equal dates.
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Self::new(symbol, deduped)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A raw point plus the values derived from its trailing window.
///
/// `moving_average` and `indicator` are `None` during the warm-up window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub moving_average: Option<f64>,
    pub indicator: Option<f64>,
}

/// Indicator output aligned 1:1 with the [`RawSeries`] it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSeries {
    pub symbol: String,
    pub window: usize,
    pub points: Vec<DerivedPoint>,
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&DerivedPoint> {
        self.points.last()
    }

    /// Number of points with a defined indicator value.
    pub fn defined_count(&self) -> usize {
        self.points.iter().filter(|p| p.indicator.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn from_unordered_sorts_by_date() {
        let series = RawSeries::from_unordered(
            "BTC-USD",
            vec![
                PricePoint::new(d(2024, 1, 3), 3.0),
                PricePoint::new(d(2024, 1, 1), 1.0),
                PricePoint::new(d(2024, 1, 2), 2.0),
            ],
        );
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.points()[0].date, d(2024, 1, 1));
    }

    #[test]
    fn from_unordered_keeps_last_duplicate() {
        let series = RawSeries::from_unordered(
            "BTC-USD",
            vec![
                PricePoint::new(d(2024, 1, 1), 1.0),
                PricePoint::new(d(2024, 1, 2), 2.0),
                PricePoint::new(d(2024, 1, 2), 2.5),
            ],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![1.0, 2.5]);
    }

    #[test]
    fn empty_series() {
        let series = RawSeries::new("X", Vec::new());
        assert!(series.is_empty());
        assert!(series.closes().is_empty());
    }
}
