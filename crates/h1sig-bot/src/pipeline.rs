//! Per-tick pipeline.
//!
//! gate → fetch (concurrent) → normalize → detect → confluence → dedup →
//! compose → dispatch. Every stage returns a typed result; the poll loop is
//! the only place that turns an error into "skip this tick".

use std::sync::Arc;

use chrono::{DateTime, Utc};
use h1sig_core::{Candle, CandleWindow, Exchange, OrderflowSnapshot, PatternKind};
use h1sig_detector::{ConfluenceEvaluation, ConfluenceEvaluator, DetectorConfig};
use h1sig_feed::{CandleNormalizer, CandleSource, FeedResult, OrderbookSource};
use h1sig_notify::{AlertComposer, Notifier};
use h1sig_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::dedup::AlertDedup;
use crate::error::AppResult;
use crate::gate::{GateState, TimingGate};

/// What one tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Outside the gate window; nothing fetched.
    GateClosed,
    /// Evaluated, no pattern confirmed on both exchanges.
    NoSignal,
    /// Confirmed, but every confirmed pattern was already alerted for this candle.
    Suppressed { patterns: Vec<PatternKind> },
    /// Alert handed to the transport. `delivered` is false when the send failed.
    Dispatched {
        patterns: Vec<PatternKind>,
        candle_close: i64,
        delivered: bool,
    },
}

impl TickOutcome {
    /// Metrics label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::GateClosed => "gate_closed",
            Self::NoSignal => "no_signal",
            Self::Suppressed { .. } => "suppressed",
            Self::Dispatched { .. } => "dispatched",
        }
    }
}

/// External I/O the pipeline talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Dedup reference exchange (Binance US).
    pub primary: Arc<dyn CandleSource>,
    pub secondary: Arc<dyn CandleSource>,
    pub orderbook: Arc<dyn OrderbookSource>,
    pub notifier: Arc<dyn Notifier>,
}

/// Stateless tick pipeline. Dedup state is passed in by the caller.
pub struct TickPipeline {
    symbol: String,
    orderbook_depth: usize,
    gate: TimingGate,
    normalizer: CandleNormalizer,
    evaluator: ConfluenceEvaluator,
    composer: AlertComposer,
    io: Collaborators,
}

impl TickPipeline {
    pub fn new(
        symbol: impl Into<String>,
        orderbook_depth: usize,
        gate_minute: u32,
        detector: &DetectorConfig,
        io: Collaborators,
    ) -> Self {
        let symbol = symbol.into();
        Self {
            composer: AlertComposer::new(symbol.clone(), gate_minute),
            symbol,
            orderbook_depth,
            gate: TimingGate::new(gate_minute),
            normalizer: CandleNormalizer::new(detector.lookback),
            evaluator: ConfluenceEvaluator::new(detector),
            io,
        }
    }

    /// Run one tick at wall-clock `now`.
    pub async fn run_tick(
        &self,
        dedup: &mut AlertDedup,
        now: DateTime<Utc>,
    ) -> AppResult<TickOutcome> {
        if self.gate.state(now) == GateState::Idle {
            return Ok(TickOutcome::GateClosed);
        }

        let limit = self.normalizer.window_len();
        let (primary, secondary, orderbook) = tokio::join!(
            self.io.primary.fetch_candles(&self.symbol, limit),
            self.io.secondary.fetch_candles(&self.symbol, limit),
            self.io.orderbook.fetch_orderbook(&self.symbol, self.orderbook_depth),
        );
        let orderflow = self.orderflow(orderbook);

        let primary_window = self.window(self.io.primary.exchange(), primary)?;
        let secondary_window = self.window(self.io.secondary.exchange(), secondary)?;

        let eval = self.evaluator.evaluate(
            (self.io.primary.exchange(), &primary_window),
            (self.io.secondary.exchange(), &secondary_window),
        );
        record_triggers(&eval);

        if !eval.confluence.any_triggered {
            return Ok(TickOutcome::NoSignal);
        }

        let candle_close = eval.reference_candle().close_time();
        let confirmed = eval.confluence.confirmed_patterns();
        let decision = dedup.claim(&confirmed, candle_close);

        for pattern in &decision.suppressed {
            Metrics::alert_suppressed(pattern.label());
        }
        if !decision.should_dispatch() {
            debug!(candle_close, patterns = ?decision.suppressed, "Already alerted for this candle");
            return Ok(TickOutcome::Suppressed {
                patterns: decision.suppressed,
            });
        }

        let text = self.composer.compose(&eval, orderflow.as_ref(), now);
        let delivered = self.dispatch(&text).await;

        Ok(TickOutcome::Dispatched {
            patterns: decision.fresh,
            candle_close,
            delivered,
        })
    }

    fn window(
        &self,
        exchange: Exchange,
        fetched: FeedResult<Vec<Candle>>,
    ) -> AppResult<CandleWindow> {
        fetched
            .and_then(|candles| self.normalizer.window(candles))
            .map_err(|e| {
                Metrics::fetch_failed(exchange.label(), e.kind());
                warn!(exchange = %exchange, error = %e, "Candle fetch failed");
                e.into()
            })
    }

    /// Order flow is context only: failure degrades to `None`. Recorded on
    /// every gated tick, whether or not an alert follows.
    fn orderflow(&self, fetched: FeedResult<OrderflowSnapshot>) -> Option<OrderflowSnapshot> {
        match fetched {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                Metrics::orderbook_unavailable();
                Metrics::fetch_failed("orderbook", e.kind());
                warn!(error = %e, "Order-book snapshot unavailable");
                None
            }
        }
    }

    /// One attempt; failure is logged and reported, never propagated.
    async fn dispatch(&self, text: &str) -> bool {
        let transport = self.io.notifier.name();
        match self.io.notifier.send(text).await {
            Ok(()) => {
                Metrics::alert_dispatched(transport);
                info!(transport, "Alert dispatched");
                true
            }
            Err(e) => {
                Metrics::transport_failed(transport);
                warn!(transport, error = %e, "Alert delivery failed");
                false
            }
        }
    }
}

fn record_triggers(eval: &ConfluenceEvaluation) {
    for signals in eval.exchanges() {
        for pattern in PatternKind::ALL {
            if signals.triggered(pattern) {
                Metrics::pattern_triggered(signals.exchange.label(), pattern.label());
            }
        }
    }
    for pattern in eval.confluence.confirmed_patterns() {
        Metrics::pattern_confirmed(pattern.label());
    }
}
