// =============================================================================
// AHR999 Deviation Ratio
// =============================================================================
//
// indicator_i = (close_i - SMA_i) / SMA_i
//
// The signed fractional distance of the close from its trailing moving
// average. This is the simplified form of the AHR999 index: it deliberately
// omits the geometric-mean-cost term of the traditional definition.
// =============================================================================

use crate::indicators::sma::rolling_mean;
use crate::types::{DerivedPoint, DerivedSeries, RawSeries};

/// Default moving-average look-back, in trading periods.
pub const DEFAULT_WINDOW: usize = 200;

/// Deviation of `close` from `moving_average` as a fraction of the average.
///
/// Returns `None` when:
/// - The moving average is undefined (warm-up window).
/// - The moving average is zero (degenerate input).
/// - The result is non-finite.
pub fn deviation_ratio(close: f64, moving_average: Option<f64>) -> Option<f64> {
    let ma = moving_average?;
    if ma == 0.0 {
        return None;
    }
    let ratio = (close - ma) / ma;
    ratio.is_finite().then_some(ratio)
}

/// Derive the moving average and indicator column for every point in `raw`.
///
/// Never fails. A series shorter than `window` produces an entirely undefined
/// indicator column; the close column is always carried through unchanged.
pub fn compute(raw: &RawSeries, window: usize) -> DerivedSeries {
    let closes = raw.closes();
    let averages = rolling_mean(&closes, window);

    let points = raw
        .points()
        .iter()
        .zip(averages)
        .map(|(p, moving_average)| DerivedPoint {
            date: p.date,
            close: p.close,
            moving_average,
            indicator: deviation_ratio(p.close, moving_average),
        })
        .collect();

    DerivedSeries {
        symbol: raw.symbol.clone(),
        window,
        points,
    }
}
