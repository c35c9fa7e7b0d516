//! Feed error types.

use thiserror::Error;

/// Errors raised while fetching or decoding exchange data.
///
/// Both classes are per-tick failures: the caller skips the tick and retries
/// on the next one.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    /// Connection failure or non-2xx response.
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded its deadline.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Payload could not be parsed or was too short.
    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl FeedError {
    /// Timeout, connection failure, non-2xx.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    /// Unparseable or short payload.
    pub fn is_data_format(&self) -> bool {
        matches!(self, Self::DataFormat(_))
    }

    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::DataFormat(_) => "data_format",
            Self::HttpClient(_) => "http_client",
        }
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        Self::DataFormat(e.to_string())
    }
}

impl From<h1sig_core::CoreError> for FeedError {
    fn from(e: h1sig_core::CoreError) -> Self {
        Self::DataFormat(e.to_string())
    }
}

pub type FeedResult<T> = Result<T, FeedError>;
