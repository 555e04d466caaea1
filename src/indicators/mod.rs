// =============================================================================
// Indicator Engine
// =============================================================================
//
// Pure, side-effect-free computations over a closing-price series. Undefined
// values are carried as `Option::None` so callers test definedness explicitly
// instead of relying on NaN propagation.

pub mod deviation;
pub mod sma;

pub use deviation::{compute, DEFAULT_WINDOW};
