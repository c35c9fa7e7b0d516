//! Error types for h1sig-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Empty candle window")]
    EmptyWindow,

    #[error("Candles out of order at index {index}: {prev} >= {next}")]
    OutOfOrder { index: usize, prev: i64, next: i64 },

    #[error("Invalid candle: {0}")]
    InvalidCandle(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
