//! VWAP-flip detector.
//!
//! Splits the window at its midpoint and compares the VWAP of each half.
//! The slope is up when the second-half VWAP is above the first. The
//! pattern triggers when the last close sits beyond the second-half VWAP
//! in the direction of the slope.

use crate::detector::PatternDetector;
use crate::indicators::{sma, vwap};
use crate::signal::DetectionResult;
use h1sig_core::{CandleWindow, PatternKind, Side};
use tracing::debug;

/// VWAP-flip detector. Stateless and parameter-free.
#[derive(Debug, Clone, Copy, Default)]
pub struct VwapFlipDetector;

impl VwapFlipDetector {
    pub fn new() -> Self {
        Self
    }
}

impl PatternDetector for VwapFlipDetector {
    fn kind(&self) -> PatternKind {
        PatternKind::VwapFlip
    }

    fn detect(&self, window: &CandleWindow) -> DetectionResult {
        let last = *window.last();
        let (first_half, second_half) = window.halves();

        let (Some(v1), Some(v2)) = (vwap(first_half), vwap(second_half)) else {
            return DetectionResult::not_triggered(PatternKind::VwapFlip, last);
        };

        let volumes: Vec<f64> = window.candles().iter().map(|c| c.volume).collect();
        let volume_baseline = sma(&volumes, volumes.len()).unwrap_or(0.0);

        let slope_up = v2 > v1;
        let side = if slope_up && last.close > v2 {
            Side::Bullish
        } else if !slope_up && last.close < v2 {
            Side::Bearish
        } else {
            Side::None
        };
        let triggered = side != Side::None;

        if triggered {
            debug!(side = %side, v1, v2, close = last.close, "VWAP flip triggered");
        }

        DetectionResult {
            pattern: PatternKind::VwapFlip,
            triggered,
            side,
            level: v2,
            reference_candle: last,
            volume_baseline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h1sig_core::Candle;
    use proptest::prelude::*;

    const HOUR: i64 = 3600;

    fn flat(t: i64, price: f64, volume: f64) -> Candle {
        Candle::new(t * HOUR, price, price, price, price, volume)
    }

    #[test]
    fn test_rising_vwap_close_above() {
        // First half at 100, second half at 110, last close 115
        let mut candles: Vec<Candle> = (0..4).map(|i| flat(i, 100.0, 1.0)).collect();
        candles.extend((4..7).map(|i| flat(i, 110.0, 1.0)));
        candles.push(Candle::new(7 * HOUR, 110.0, 115.0, 110.0, 115.0, 1.0));
        let window = CandleWindow::new(candles).unwrap();

        let result = VwapFlipDetector::new().detect(&window);
        assert!(result.triggered);
        assert_eq!(result.side, Side::Bullish);
        assert!(result.level > 110.0);
    }

    #[test]
    fn test_falling_vwap_close_below() {
        let mut candles: Vec<Candle> = (0..4).map(|i| flat(i, 110.0, 1.0)).collect();
        candles.extend((4..7).map(|i| flat(i, 100.0, 1.0)));
        candles.push(Candle::new(7 * HOUR, 100.0, 100.0, 94.0, 94.0, 1.0));
        let window = CandleWindow::new(candles).unwrap();

        let result = VwapFlipDetector::new().detect(&window);
        assert!(result.triggered);
        assert_eq!(result.side, Side::Bearish);
    }

    #[test]
    fn test_rising_vwap_close_below_does_not_trigger() {
        let mut candles: Vec<Candle> = (0..4).map(|i| flat(i, 100.0, 1.0)).collect();
        candles.extend((4..7).map(|i| flat(i, 110.0, 1.0)));
        candles.push(Candle::new(7 * HOUR, 110.0, 110.0, 104.0, 104.0, 1.0));
        let window = CandleWindow::new(candles).unwrap();

        let result = VwapFlipDetector::new().detect(&window);
        assert!(!result.triggered);
        assert_eq!(result.side, Side::None);
    }

    #[test]
    fn test_flat_vwap_needs_close_below() {
        // v1 == v2 == 100 is not an up slope; close must be below v2
        let mut candles: Vec<Candle> = (0..7).map(|i| flat(i, 100.0, 1.0)).collect();
        candles.push(flat(7, 100.0, 1.0));
        let window = CandleWindow::new(candles.clone()).unwrap();
        assert!(!VwapFlipDetector::new().detect(&window).triggered);

        // Last typical price 98 -> v2 = 99.5 < v1, close 97 < v2
        candles[7] = Candle::new(7 * HOUR, 100.0, 100.0, 97.0, 97.0, 1.0);
        let window = CandleWindow::new(candles).unwrap();
        let result = VwapFlipDetector::new().detect(&window);
        assert!(result.triggered);
        assert_eq!(result.side, Side::Bearish);
        assert_eq!(result.level, 99.5);
    }

    #[test]
    fn test_zero_volume_half_is_undefined() {
        let mut candles: Vec<Candle> = (0..4).map(|i| flat(i, 100.0, 0.0)).collect();
        candles.extend((4..8).map(|i| flat(i, 120.0, 5.0)));
        let window = CandleWindow::new(candles).unwrap();

        let result = VwapFlipDetector::new().detect(&window);
        assert!(!result.triggered);
        assert_eq!(result.level, 0.0);
    }

    #[test]
    fn test_single_candle_window_undefined() {
        let window = CandleWindow::new(vec![flat(0, 100.0, 5.0)]).unwrap();
        assert!(!VwapFlipDetector::new().detect(&window).triggered);
    }

    proptest! {
        /// Scaling every price by a power of two is exact in f64, so the
        /// outcome must be identical.
        #[test]
        fn prop_scale_invariant(
            rows in prop::collection::vec((1.0f64..1e4, 0.0f64..50.0, 0.0f64..1.0, 0.0f64..1e3), 1..40),
            exp in -8i32..8,
        ) {
            let candles: Vec<Candle> = rows
                .iter()
                .enumerate()
                .map(|(i, (low, span, frac, vol))| {
                    Candle::new(i as i64 * HOUR, *low, low + span, *low, low + span * frac, *vol)
                })
                .collect();
            let window = CandleWindow::new(candles).unwrap();
            let k = 2f64.powi(exp);

            let detector = VwapFlipDetector::new();
            let base = detector.detect(&window);
            let scaled = detector.detect(&window.scale_prices(k));

            prop_assert_eq!(base.triggered, scaled.triggered);
            prop_assert_eq!(base.side, scaled.side);
        }
    }
}
