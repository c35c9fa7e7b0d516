//! Canonical OHLCV candle and ordered candle window.
//!
//! Every exchange reply is normalized into this shape before any detector
//! sees it. Timestamps are integer seconds since the Unix epoch.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Length of one candle in seconds (hourly candles).
pub const CANDLE_INTERVAL_SECS: i64 = 3600;

/// One OHLCV candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time in seconds since epoch.
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Create a new candle.
    pub fn new(open_time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open_time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Closing timestamp (open time + one interval), in seconds.
    pub fn close_time(&self) -> i64 {
        self.open_time + CANDLE_INTERVAL_SECS
    }

    /// Typical price: (high + low + close) / 3.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Copy of this candle with every price field multiplied by `k`.
    ///
    /// Volume and open time are unchanged.
    pub fn scale_prices(&self, k: f64) -> Self {
        Self {
            open: self.open * k,
            high: self.high * k,
            low: self.low * k,
            close: self.close * k,
            ..*self
        }
    }
}

/// Ordered sequence of candles, oldest first.
///
/// Invariants enforced at construction:
/// - at least one candle
/// - `open_time` strictly ascending (no duplicates)
///
/// The last element is the current, possibly still-forming candle; all
/// elements before it are closed. Windows are rebuilt from a fresh fetch
/// every poll and never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleWindow {
    candles: Vec<Candle>,
}

impl CandleWindow {
    /// Build a window, validating ordering.
    pub fn new(candles: Vec<Candle>) -> Result<Self> {
        if candles.is_empty() {
            return Err(CoreError::EmptyWindow);
        }

        for (i, pair) in candles.windows(2).enumerate() {
            if pair[0].open_time >= pair[1].open_time {
                return Err(CoreError::OutOfOrder {
                    index: i + 1,
                    prev: pair[0].open_time,
                    next: pair[1].open_time,
                });
            }
        }

        for c in &candles {
            let fields = [c.open, c.high, c.low, c.close, c.volume];
            if fields.iter().any(|v| !v.is_finite()) {
                return Err(CoreError::InvalidCandle(format!(
                    "non-finite value in candle at {}",
                    c.open_time
                )));
            }
        }

        Ok(Self { candles })
    }

    /// All candles, oldest first.
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Whether the window holds no candles. False for any constructed window.
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// The candle under evaluation (last element).
    pub fn last(&self) -> &Candle {
        // Non-empty by construction.
        &self.candles[self.candles.len() - 1]
    }

    /// All candles before the last one.
    pub fn closed(&self) -> &[Candle] {
        &self.candles[..self.candles.len() - 1]
    }

    /// Split at `len / 2`; for odd lengths the first half is one shorter.
    pub fn halves(&self) -> (&[Candle], &[Candle]) {
        self.candles.split_at(self.candles.len() / 2)
    }

    /// Copy of this window with every price multiplied by `k`.
    pub fn scale_prices(&self, k: f64) -> Self {
        Self {
            candles: self.candles.iter().map(|c| c.scale_prices(k)).collect(),
        }
    }
}
