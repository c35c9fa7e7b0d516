//! Liquidity fakeout detector.
//!
//! The tested candle (last in window) pierces the range of the closed
//! candles before it, closes back inside, and prints a volume spike:
//! - Bearish: high > range_high, close < range_high
//! - Bullish: low < range_low, close > range_low
//! - both require volume > avg_closed_volume * vol_spike_mult

use crate::detector::PatternDetector;
use crate::indicators::sma;
use crate::signal::DetectionResult;
use h1sig_core::{CandleWindow, PatternKind, Side};
use tracing::debug;

/// Fakeout detector.
#[derive(Debug, Clone, Copy)]
pub struct FakeoutDetector {
    vol_spike_mult: f64,
}

impl FakeoutDetector {
    pub fn new(vol_spike_mult: f64) -> Self {
        Self { vol_spike_mult }
    }
}

impl PatternDetector for FakeoutDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::Fakeout
    }

    fn detect(&self, window: &CandleWindow) -> DetectionResult {
        let last = *window.last();
        let closed = window.closed();

        let volumes: Vec<f64> = closed.iter().map(|c| c.volume).collect();
        let Some(avg_vol) = sma(&volumes, volumes.len()) else {
            return DetectionResult::not_triggered(PatternKind::Fakeout, last);
        };

        let range_high = closed.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let range_low = closed.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

        // A zero baseline is compared as-is: any positive volume is a spike.
        let spike = last.volume > avg_vol * self.vol_spike_mult;
        let bearish = spike && last.high > range_high && last.close < range_high;
        let bullish = spike && last.low < range_low && last.close > range_low;

        let (side, level) = match (bearish, bullish) {
            (true, false) => (Side::Bearish, range_high),
            (false, true) => (Side::Bullish, range_low),
            (true, true) => {
                // Outside bar swept both bounds: the rejected side is the one
                // the close moved away from.
                let mid = (range_high + range_low) / 2.0;
                if last.close >= mid {
                    (Side::Bullish, range_low)
                } else {
                    (Side::Bearish, range_high)
                }
            }
            (false, false) => {
                return DetectionResult {
                    volume_baseline: avg_vol,
                    ..DetectionResult::not_triggered(PatternKind::Fakeout, last)
                };
            }
        };

        debug!(
            side = %side,
            level,
            range_high,
            range_low,
            volume = last.volume,
            avg_vol,
            "Fakeout triggered"
        );

        DetectionResult {
            pattern: PatternKind::Fakeout,
            triggered: true,
            side,
            level,
            reference_candle: last,
            volume_baseline: avg_vol,
        }
    }
}
