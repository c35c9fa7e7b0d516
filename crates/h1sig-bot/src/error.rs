//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed error: {0}")]
    Feed(#[from] h1sig_feed::FeedError),

    #[error("Detector error: {0}")]
    Detector(#[from] h1sig_detector::DetectorError),

    #[error("Notify error: {0}")]
    Notify(#[from] h1sig_notify::NotifyError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] h1sig_telemetry::TelemetryError),

    #[error("Health server error: {0}")]
    Health(#[from] h1sig_health::HealthError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
