//! Notification error types.

use thiserror::Error;

/// Notification errors.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// Delivery failed: connection error, timeout, non-2xx or `ok=false`.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

pub type NotifyResult<T> = Result<T, NotifyError>;
