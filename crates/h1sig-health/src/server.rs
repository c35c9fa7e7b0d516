//! HTTP server implementation using axum.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::HealthConfig;
use crate::error::{HealthError, HealthResult};

const SERVICE_NAME: &str = "h1sig";

/// Read-only state shared with handlers.
#[derive(Debug, Clone)]
pub struct HealthState {
    symbol: Arc<str>,
    started: Instant,
}

impl HealthState {
    pub fn new(symbol: impl Into<Arc<str>>) -> Self {
        Self {
            symbol: symbol.into(),
            started: Instant::now(),
        }
    }
}

/// `/health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub symbol: String,
    pub uptime_secs: u64,
}

/// Create the axum router.
pub fn create_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(heartbeat))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn heartbeat(State(state): State<HealthState>) -> String {
    format!("{} 1H Signal Bot is running (heartbeat).", state.symbol)
}

async fn health(State(state): State<HealthState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        symbol: state.symbol.to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
    })
}

async fn metrics() -> Response {
    match h1sig_telemetry::encode_metrics() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Run the liveness server until the listener fails.
pub async fn run_server(state: HealthState, config: HealthConfig) -> HealthResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| HealthError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    info!(port = config.port, "Starting health server");
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
