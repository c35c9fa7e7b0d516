//! End-to-end tick pipeline tests against in-memory exchanges and notifier.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use h1sig_bot::{AlertDedup, AppError, Collaborators, TickOutcome, TickPipeline};
use h1sig_core::{Candle, Exchange, OrderflowSnapshot, PatternKind};
use h1sig_detector::DetectorConfig;
use h1sig_feed::{FeedError, MockCandleSource, MockOrderbookSource};
use h1sig_notify::{MockNotifier, NotifyError};
use h1sig_telemetry::metrics::ORDERBOOK_UNAVAILABLE_TOTAL;

const HOUR: i64 = 3600;
/// Hour-aligned epoch seconds.
const BASE: i64 = 1_699_999_200;

/// 24 closed candles ranging 90..110 at volume 10, then a candle that sweeps
/// below to 85 and closes back inside at 105 with `last_volume`.
///
/// The close sits above the second-half VWAP while the VWAP slopes down, so
/// only the fakeout can trigger.
fn bullish_fakeout(start: i64, last_volume: f64) -> Vec<Candle> {
    let mut candles: Vec<Candle> = (0..24)
        .map(|i| Candle::new(start + i * HOUR, 100.0, 110.0, 90.0, 100.0, 10.0))
        .collect();
    candles.push(Candle::new(start + 24 * HOUR, 95.0, 106.0, 85.0, 105.0, last_volume));
    candles
}

fn armed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 11, 15, 0, 52, 0).unwrap()
}

struct Harness {
    binance: Arc<MockCandleSource>,
    bybit: Arc<MockCandleSource>,
    orderbook: Arc<MockOrderbookSource>,
    notifier: Arc<MockNotifier>,
    pipeline: TickPipeline,
}

impl Harness {
    fn new(binance: Vec<Candle>, bybit: Vec<Candle>, orderbook: MockOrderbookSource) -> Self {
        let binance = Arc::new(MockCandleSource::with_candles(Exchange::BinanceUs, binance));
        let bybit = Arc::new(MockCandleSource::with_candles(Exchange::Bybit, bybit));
        let orderbook = Arc::new(orderbook);
        let notifier = Arc::new(MockNotifier::new());

        let io = Collaborators {
            primary: binance.clone(),
            secondary: bybit.clone(),
            orderbook: orderbook.clone(),
            notifier: notifier.clone(),
        };
        let pipeline = TickPipeline::new("BTCUSDT", 200, 50, &DetectorConfig::default(), io);

        Self {
            binance,
            bybit,
            orderbook,
            notifier,
            pipeline,
        }
    }

    fn with_orderflow(binance: Vec<Candle>, bybit: Vec<Candle>) -> Self {
        Self::new(
            binance,
            bybit,
            MockOrderbookSource::new(OrderflowSnapshot::new(150.0, 50.0)),
        )
    }
}

#[tokio::test]
async fn test_gate_closed_skips_all_io() {
    let h = Harness::with_orderflow(bullish_fakeout(BASE, 20.0), bullish_fakeout(BASE, 20.0));
    let mut dedup = AlertDedup::new();

    let early = Utc.with_ymd_and_hms(2023, 11, 15, 0, 49, 59).unwrap();
    let outcome = h.pipeline.run_tick(&mut dedup, early).await.unwrap();

    assert_eq!(outcome, TickOutcome::GateClosed);
    assert_eq!(h.binance.call_count(), 0);
    assert_eq!(h.bybit.call_count(), 0);
    assert_eq!(h.orderbook.call_count(), 0);
    assert_eq!(h.notifier.attempt_count(), 0);
}

#[tokio::test]
async fn test_both_exchanges_bullish_fakeout_dispatches() {
    let h = Harness::with_orderflow(bullish_fakeout(BASE, 20.0), bullish_fakeout(BASE, 19.0));
    let mut dedup = AlertDedup::new();

    let outcome = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap();

    let candle_close = BASE + 25 * HOUR;
    assert_eq!(
        outcome,
        TickOutcome::Dispatched {
            patterns: vec![PatternKind::Fakeout],
            candle_close,
            delivered: true,
        }
    );
    assert_eq!(dedup.last_alerted(PatternKind::Fakeout), Some(candle_close));
    assert_eq!(dedup.last_alerted(PatternKind::VwapFlip), None);

    let sent = h.notifier.sent_messages();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Fakeout: ✅ (bullish @ 90.00)"));
    assert!(sent[0].contains("VWAP Flip: ❌"));
    assert!(sent[0].contains("Order Flow Delta: 100.00 | Imbalance: 75.0%"));
}

#[tokio::test]
async fn test_weak_spike_on_one_exchange_does_not_dispatch() {
    // 1.5x average on Bybit
    let h = Harness::with_orderflow(bullish_fakeout(BASE, 20.0), bullish_fakeout(BASE, 15.0));
    let mut dedup = AlertDedup::new();

    let outcome = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap();

    assert_eq!(outcome, TickOutcome::NoSignal);
    assert_eq!(h.notifier.attempt_count(), 0);
    assert_eq!(dedup.last_alerted(PatternKind::Fakeout), None);
}

#[tokio::test]
async fn test_orderbook_failure_degrades_to_unavailable() {
    let h = Harness::new(
        bullish_fakeout(BASE, 20.0),
        bullish_fakeout(BASE, 20.0),
        MockOrderbookSource::failing(FeedError::Network("connection refused".to_string())),
    );
    let mut dedup = AlertDedup::new();

    let outcome = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap();

    assert!(matches!(outcome, TickOutcome::Dispatched { delivered: true, .. }));
    let sent = h.notifier.sent_messages();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Order Flow Delta: unavailable | Imbalance: unavailable"));
}

#[tokio::test]
async fn test_orderbook_failure_recorded_without_signal() {
    let h = Harness::new(
        bullish_fakeout(BASE, 20.0),
        bullish_fakeout(BASE, 15.0),
        MockOrderbookSource::failing(FeedError::Timeout("bybit orderbook".to_string())),
    );
    let mut dedup = AlertDedup::new();
    let before = ORDERBOOK_UNAVAILABLE_TOTAL.get();

    let outcome = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap();

    assert_eq!(outcome, TickOutcome::NoSignal);
    assert_eq!(h.orderbook.call_count(), 1);
    assert!(ORDERBOOK_UNAVAILABLE_TOTAL.get() >= before + 1.0);
}

#[tokio::test]
async fn test_same_candle_alerts_once_then_next_candle_again() {
    let h = Harness::with_orderflow(bullish_fakeout(BASE, 20.0), bullish_fakeout(BASE, 20.0));
    let mut dedup = AlertDedup::new();

    let first = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap();
    assert!(matches!(first, TickOutcome::Dispatched { .. }));

    let second = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap();
    assert_eq!(
        second,
        TickOutcome::Suppressed {
            patterns: vec![PatternKind::Fakeout]
        }
    );
    assert_eq!(h.notifier.attempt_count(), 1);

    // One hour later the same shape repeats on a new candle
    h.binance.set_candles(bullish_fakeout(BASE + HOUR, 20.0));
    h.bybit.set_candles(bullish_fakeout(BASE + HOUR, 20.0));
    let third = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap();

    assert!(matches!(
        third,
        TickOutcome::Dispatched { candle_close, .. } if candle_close == BASE + 26 * HOUR
    ));
    assert_eq!(h.notifier.attempt_count(), 2);
}

#[tokio::test]
async fn test_transport_failure_still_commits_dedup() {
    let h = Harness::with_orderflow(bullish_fakeout(BASE, 20.0), bullish_fakeout(BASE, 20.0));
    h.notifier
        .set_failure(Some(NotifyError::Transport("HTTP 502".to_string())));
    let mut dedup = AlertDedup::new();

    let first = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap();
    assert!(matches!(first, TickOutcome::Dispatched { delivered: false, .. }));

    // Transport recovers, but this candle was already decided
    h.notifier.set_failure(None);
    let second = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap();
    assert!(matches!(second, TickOutcome::Suppressed { .. }));
    assert_eq!(h.notifier.attempt_count(), 1);
    assert!(h.notifier.sent_messages().is_empty());
}

#[tokio::test]
async fn test_newest_first_and_longer_replies_are_normalized() {
    // 26 candles, one more than needed, newest first like Bybit v5
    let mut bybit = vec![Candle::new(BASE - HOUR, 100.0, 110.0, 90.0, 100.0, 10.0)];
    bybit.extend(bullish_fakeout(BASE, 20.0));
    bybit.reverse();

    let h = Harness::with_orderflow(bullish_fakeout(BASE, 20.0), bybit);
    let mut dedup = AlertDedup::new();

    let outcome = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap();
    assert!(matches!(outcome, TickOutcome::Dispatched { .. }));
}

#[tokio::test]
async fn test_fetch_failure_fails_tick() {
    let h = Harness::with_orderflow(bullish_fakeout(BASE, 20.0), bullish_fakeout(BASE, 20.0));
    h.bybit
        .set_error(FeedError::Timeout("bybit klines exceeded 10000ms".to_string()));
    let mut dedup = AlertDedup::new();

    let err = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap_err();
    assert!(matches!(err, AppError::Feed(ref e) if e.is_network()));
    assert_eq!(h.notifier.attempt_count(), 0);
}

#[tokio::test]
async fn test_short_reply_is_data_format_error() {
    let mut short = bullish_fakeout(BASE, 20.0);
    short.truncate(10);
    let h = Harness::with_orderflow(short, bullish_fakeout(BASE, 20.0));
    let mut dedup = AlertDedup::new();

    let err = h.pipeline.run_tick(&mut dedup, armed_time()).await.unwrap_err();
    assert!(matches!(err, AppError::Feed(ref e) if e.is_data_format()));
}
