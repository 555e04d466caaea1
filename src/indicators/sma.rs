// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// SMA_i = (close_{i-window+1} + ... + close_i) / window
//
// Every output element corresponds 1:1 to an input close. The first
// `window - 1` elements have no full window behind them and are `None`.
// =============================================================================

/// Compute the trailing simple moving average of `closes` over `window`.
///
/// Each window is summed directly rather than with a running total, so the
/// value at index `i` depends only on `closes[i + 1 - window..=i]` and carries
/// no accumulated rounding from earlier points.
///
/// # Edge cases
/// - `window == 0` => every element is `None`
/// - `closes.len() < window` => every element is `None`
pub fn rolling_mean(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; closes.len()];
    }

    let divisor = window as f64;
    (0..closes.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let sum: f64 = closes[i + 1 - window..=i].iter().sum();
            Some(sum / divisor)
        })
        .collect()
}
