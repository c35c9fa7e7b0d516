//! Candle and order-book source traits.
//!
//! Abstracts exchange I/O so the tick pipeline can run against:
//! - the real REST clients in `client.rs`
//! - in-memory mocks in unit and integration tests

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use h1sig_core::{Candle, Exchange, OrderflowSnapshot};
use parking_lot::Mutex;

use crate::error::{FeedError, FeedResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Source of hourly candles for one exchange.
pub trait CandleSource: Send + Sync {
    /// Exchange this source reads from.
    fn exchange(&self) -> Exchange;

    /// Fetch up to `limit` hourly candles for `symbol`.
    ///
    /// Timestamps are in seconds; ordering is whatever the exchange returns
    /// (the normalizer fixes it).
    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, FeedResult<Vec<Candle>>>;
}

/// Source of order-book depth snapshots.
pub trait OrderbookSource: Send + Sync {
    fn fetch_orderbook<'a>(
        &'a self,
        symbol: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, FeedResult<OrderflowSnapshot>>;
}

/// Mock candle source for testing.
#[derive(Debug)]
pub struct MockCandleSource {
    exchange: Exchange,
    /// One-shot results, consumed before `next_result`.
    queued: Mutex<VecDeque<FeedResult<Vec<Candle>>>>,
    /// Result returned once the queue is empty.
    next_result: Mutex<FeedResult<Vec<Candle>>>,
    calls: AtomicUsize,
}

impl MockCandleSource {
    /// Create a source that returns no candles.
    pub fn new(exchange: Exchange) -> Self {
        Self {
            exchange,
            queued: Mutex::new(VecDeque::new()),
            next_result: Mutex::new(Ok(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a source returning `candles` on every call.
    pub fn with_candles(exchange: Exchange, candles: Vec<Candle>) -> Self {
        let source = Self::new(exchange);
        source.set_candles(candles);
        source
    }

    pub fn set_candles(&self, candles: Vec<Candle>) {
        *self.next_result.lock() = Ok(candles);
    }

    pub fn set_error(&self, error: FeedError) {
        *self.next_result.lock() = Err(error);
    }

    /// Fail only the next fetch; later fetches fall back to the set result.
    pub fn fail_next(&self, error: FeedError) {
        self.queued.lock().push_back(Err(error));
    }

    /// Number of fetches performed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CandleSource for MockCandleSource {
    fn exchange(&self) -> Exchange {
        self.exchange
    }

    fn fetch_candles<'a>(
        &'a self,
        _symbol: &'a str,
        _limit: usize,
    ) -> BoxFuture<'a, FeedResult<Vec<Candle>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.queued.lock().pop_front();
        let result = queued.unwrap_or_else(|| self.next_result.lock().clone());
        Box::pin(async move { result })
    }
}

/// Mock order-book source for testing.
#[derive(Debug)]
pub struct MockOrderbookSource {
    next_result: Mutex<FeedResult<OrderflowSnapshot>>,
    calls: AtomicUsize,
}

impl Default for MockOrderbookSource {
    fn default() -> Self {
        Self::new(OrderflowSnapshot::default())
    }
}

impl MockOrderbookSource {
    pub fn new(snapshot: OrderflowSnapshot) -> Self {
        Self {
            next_result: Mutex::new(Ok(snapshot)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: FeedError) -> Self {
        Self {
            next_result: Mutex::new(Err(error)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OrderbookSource for MockOrderbookSource {
    fn fetch_orderbook<'a>(
        &'a self,
        _symbol: &'a str,
        _depth: usize,
    ) -> BoxFuture<'a, FeedResult<OrderflowSnapshot>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = self.next_result.lock().clone();
        Box::pin(async move { result })
    }
}
