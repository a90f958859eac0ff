//! Error types for the allocation engine and its collaborators.

/// Errors from engine operations that address an entry or parse a mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error("entry index {index} out of range (set has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown allocation mode: {0}")]
    UnknownMode(String),
}

/// Reasons an allocation cannot be saved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("allocation totals {total:.2}%, expected 100% (±{tolerance})")]
    TotalMismatch { total: f64, tolerance: f64 },

    #[error("entry {index} holds {percentage:.2}% but has no symbol")]
    MissingSymbol { index: usize, percentage: f64 },
}

/// Failures at the weight-provider boundary. The engine never sees these:
/// [`weights_or_uniform`](crate::weights::weights_or_uniform) converts them
/// to uniform weights.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("market data unavailable: {0}")]
    Unavailable(String),

    #[error("no quote for {0}")]
    MissingQuote(String),

    #[error("invalid quote for {symbol}: {reason}")]
    InvalidQuote { symbol: String, reason: String },
}

/// Errors decoding a strategy-configuration payload.
#[cfg(feature = "payload")]
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("failed to parse payload JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("allocation for '{symbol}' must be within [0, 100], got {value}")]
    InvalidAllocation { symbol: String, value: f64 },

    #[error("cash_balance_percent must be within [0, 100], got {0}")]
    InvalidCash(f64),
}
