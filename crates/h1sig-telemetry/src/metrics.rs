//! Prometheus metrics for the h1sig bot.
//!
//! Provides observability for:
//! - Poll loop ticks and their outcomes
//! - Exchange fetch failures
//! - Per-exchange pattern triggers and confirmed confluence
//! - Alert dispatch, dedup suppression and transport failures
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a programming error caught at startup.

use crate::error::{TelemetryError, TelemetryResult};
use chrono::Utc;
use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_gauge, register_histogram, Counter,
    CounterVec, Encoder, Gauge, Histogram, TextEncoder,
};

/// Poll loop ticks by outcome.
/// Labels: outcome (gate_closed/no_signal/suppressed/dispatched/failed)
pub static TICKS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!("h1sig_ticks_total", "Poll loop ticks by outcome", &["outcome"])
        .unwrap()
});

/// Tick pipeline duration (gated ticks only).
pub static TICK_DURATION_MS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "h1sig_tick_duration_ms",
        "Duration of gated tick pipeline in milliseconds",
        vec![50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 20000.0]
    )
    .unwrap()
});

/// Unix timestamp of the last completed tick.
pub static LAST_TICK_TIMESTAMP: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "h1sig_last_tick_timestamp_seconds",
        "Unix timestamp of the last completed tick"
    )
    .unwrap()
});

/// Fetch failures by source and error kind.
pub static FETCH_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "h1sig_fetch_failures_total",
        "Exchange fetch failures",
        &["source", "kind"]
    )
    .unwrap()
});

/// Single-exchange pattern triggers.
pub static PATTERN_TRIGGERS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "h1sig_pattern_triggers_total",
        "Pattern triggers on a single exchange",
        &["exchange", "pattern"]
    )
    .unwrap()
});

/// Patterns confirmed on both exchanges.
pub static PATTERN_CONFIRMED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "h1sig_pattern_confirmed_total",
        "Patterns confirmed by cross-exchange confluence",
        &["pattern"]
    )
    .unwrap()
});

/// Alerts handed to the transport.
pub static ALERTS_DISPATCHED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "h1sig_alerts_dispatched_total",
        "Alerts handed to the notification transport",
        &["transport"]
    )
    .unwrap()
});

/// Confirmed patterns suppressed by dedup.
pub static ALERTS_SUPPRESSED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "h1sig_alerts_suppressed_total",
        "Confirmed patterns suppressed as already alerted for this candle",
        &["pattern"]
    )
    .unwrap()
});

/// Notification transport failures.
pub static TRANSPORT_FAILURES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "h1sig_transport_failures_total",
        "Notification delivery failures",
        &["transport"]
    )
    .unwrap()
});

/// Order-book snapshots that were unavailable at alert time.
pub static ORDERBOOK_UNAVAILABLE_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "h1sig_orderbook_unavailable_total",
        "Order-book snapshot fetches that failed"
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record a tick outcome and stamp the last-tick gauge.
    pub fn tick(outcome: &str) {
        TICKS_TOTAL.with_label_values(&[outcome]).inc();
        LAST_TICK_TIMESTAMP.set(Utc::now().timestamp() as f64);
    }

    pub fn tick_duration(duration_ms: f64) {
        TICK_DURATION_MS.observe(duration_ms);
    }

    pub fn fetch_failed(source: &str, kind: &str) {
        FETCH_FAILURES_TOTAL.with_label_values(&[source, kind]).inc();
    }

    pub fn pattern_triggered(exchange: &str, pattern: &str) {
        PATTERN_TRIGGERS_TOTAL
            .with_label_values(&[exchange, pattern])
            .inc();
    }

    pub fn pattern_confirmed(pattern: &str) {
        PATTERN_CONFIRMED_TOTAL.with_label_values(&[pattern]).inc();
    }

    pub fn alert_dispatched(transport: &str) {
        ALERTS_DISPATCHED_TOTAL.with_label_values(&[transport]).inc();
    }

    pub fn alert_suppressed(pattern: &str) {
        ALERTS_SUPPRESSED_TOTAL.with_label_values(&[pattern]).inc();
    }

    pub fn transport_failed(transport: &str) {
        TRANSPORT_FAILURES_TOTAL.with_label_values(&[transport]).inc();
    }

    pub fn orderbook_unavailable() {
        ORDERBOOK_UNAVAILABLE_TOTAL.inc();
    }
}

/// Render all registered metrics in the Prometheus text format.
pub fn encode_metrics() -> TelemetryResult<String> {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buf = Vec::new();
    encoder
        .encode(&families, &mut buf)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
}
