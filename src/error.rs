// =============================================================================
// Pipeline error taxonomy
// =============================================================================
//
// Only two failure kinds ever reach a caller. A series shorter than the
// moving-average window is NOT an error: it yields an all-undefined indicator
// column and still renders.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed symbol, date or title. Raised before any fetch.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The provider returned no usable rows, or the fetch itself failed.
    #[error("no price data available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },
}

impl PipelineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
