//! h1sig-health - Liveness endpoint for the h1sig bot.
//!
//! A side listener that shares nothing with the poll loop beyond read-only
//! startup data:
//!
//! - `GET /`        → plain-text heartbeat
//! - `GET /health`  → JSON status with uptime
//! - `GET /metrics` → Prometheus text exposition
//!
//! # Usage
//!
//! ```ignore
//! use h1sig_health::{run_server, HealthConfig, HealthState};
//!
//! let state = HealthState::new("BTCUSDT");
//! tokio::spawn(async move {
//!     if let Err(e) = run_server(state, HealthConfig::default()).await {
//!         tracing::error!(error = %e, "Health server failed");
//!     }
//! });
//! ```

mod config;
mod error;
mod server;

pub use config::HealthConfig;
pub use error::{HealthError, HealthResult};
pub use server::{create_router, run_server, HealthState, HealthStatus};
