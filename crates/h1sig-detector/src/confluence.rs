//! Cross-exchange confluence.
//!
//! A pattern is confirmed only when it triggers on both exchanges (AND);
//! an alert is raised when any pattern is confirmed (OR). A single exchange
//! triggering alone is treated as noise.

use crate::config::DetectorConfig;
use crate::detector::PatternDetector;
use crate::fakeout::FakeoutDetector;
use crate::signal::DetectionResult;
use crate::vwap_flip::VwapFlipDetector;
use h1sig_core::{Candle, CandleWindow, Exchange, PatternKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Both detector results for one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExchangeSignals {
    pub exchange: Exchange,
    pub fakeout: DetectionResult,
    pub vwap_flip: DetectionResult,
}

impl ExchangeSignals {
    /// Result for `pattern`.
    pub fn get(&self, pattern: PatternKind) -> &DetectionResult {
        match pattern {
            PatternKind::Fakeout => &self.fakeout,
            PatternKind::VwapFlip => &self.vwap_flip,
        }
    }

    pub fn triggered(&self, pattern: PatternKind) -> bool {
        self.get(pattern).triggered
    }

    pub fn any_triggered(&self) -> bool {
        self.fakeout.triggered || self.vwap_flip.triggered
    }
}

/// Combined decision across exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfluenceResult {
    pub fakeout_confirmed: bool,
    pub vwap_flip_confirmed: bool,
    pub any_triggered: bool,
}

impl ConfluenceResult {
    /// AND each pattern across the two exchanges, OR across patterns.
    pub fn combine(a: &ExchangeSignals, b: &ExchangeSignals) -> Self {
        let fakeout_confirmed = a.fakeout.triggered && b.fakeout.triggered;
        let vwap_flip_confirmed = a.vwap_flip.triggered && b.vwap_flip.triggered;
        Self {
            fakeout_confirmed,
            vwap_flip_confirmed,
            any_triggered: fakeout_confirmed || vwap_flip_confirmed,
        }
    }

    pub fn is_confirmed(&self, pattern: PatternKind) -> bool {
        match pattern {
            PatternKind::Fakeout => self.fakeout_confirmed,
            PatternKind::VwapFlip => self.vwap_flip_confirmed,
        }
    }

    /// Confirmed patterns in `PatternKind::ALL` order.
    pub fn confirmed_patterns(&self) -> Vec<PatternKind> {
        PatternKind::ALL
            .into_iter()
            .filter(|p| self.is_confirmed(*p))
            .collect()
    }
}

/// Everything one tick's evaluation produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceEvaluation {
    /// Exchange whose last candle is the dedup reference (Binance US).
    pub primary: ExchangeSignals,
    pub secondary: ExchangeSignals,
    pub confluence: ConfluenceResult,
}

impl ConfluenceEvaluation {
    /// Candle under test on the primary exchange.
    pub fn reference_candle(&self) -> Candle {
        self.primary.fakeout.reference_candle
    }

    /// Both exchanges, primary first.
    pub fn exchanges(&self) -> [&ExchangeSignals; 2] {
        [&self.primary, &self.secondary]
    }
}

/// Runs both detectors on both windows and combines the results.
#[derive(Debug, Clone, Copy)]
pub struct ConfluenceEvaluator {
    fakeout: FakeoutDetector,
    vwap_flip: VwapFlipDetector,
}

impl ConfluenceEvaluator {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            fakeout: FakeoutDetector::new(config.vol_spike_mult),
            vwap_flip: VwapFlipDetector::new(),
        }
    }

    /// Run both detectors on a single exchange's window.
    pub fn evaluate_exchange(&self, exchange: Exchange, window: &CandleWindow) -> ExchangeSignals {
        let signals = ExchangeSignals {
            exchange,
            fakeout: self.fakeout.detect(window),
            vwap_flip: self.vwap_flip.detect(window),
        };

        debug!(
            exchange = %exchange,
            fakeout = signals.fakeout.triggered,
            vwap_flip = signals.vwap_flip.triggered,
            "Exchange evaluated"
        );

        signals
    }

    /// Evaluate both exchanges and combine.
    pub fn evaluate(
        &self,
        primary: (Exchange, &CandleWindow),
        secondary: (Exchange, &CandleWindow),
    ) -> ConfluenceEvaluation {
        let primary = self.evaluate_exchange(primary.0, primary.1);
        let secondary = self.evaluate_exchange(secondary.0, secondary.1);
        let confluence = ConfluenceResult::combine(&primary, &secondary);

        ConfluenceEvaluation {
            primary,
            secondary,
            confluence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use h1sig_core::Side;

    const HOUR: i64 = 3600;

    /// 24 closed candles 90..110 @ vol 10, last sweeps below to 85 and
    /// closes at 95 with `last_volume`.
    fn bullish_fakeout_window(last_volume: f64) -> CandleWindow {
        let mut candles: Vec<Candle> = (0..24)
            .map(|i| Candle::new(i * HOUR, 100.0, 110.0, 90.0, 100.0, 10.0))
            .collect();
        candles.push(Candle::new(24 * HOUR, 95.0, 100.0, 85.0, 95.0, last_volume));
        CandleWindow::new(candles).unwrap()
    }

    fn signals(fakeout: bool, vwap_flip: bool) -> ExchangeSignals {
        let c = Candle::new(0, 1.0, 1.0, 1.0, 1.0, 1.0);
        let mut f = DetectionResult::not_triggered(PatternKind::Fakeout, c);
        f.triggered = fakeout;
        let mut v = DetectionResult::not_triggered(PatternKind::VwapFlip, c);
        v.triggered = vwap_flip;
        ExchangeSignals {
            exchange: Exchange::BinanceUs,
            fakeout: f,
            vwap_flip: v,
        }
    }

    #[test]
    fn test_combine_truth_table() {
        let one_sided = ConfluenceResult::combine(&signals(true, false), &signals(false, false));
        assert!(!one_sided.fakeout_confirmed);
        assert!(!one_sided.any_triggered);

        let both = ConfluenceResult::combine(&signals(true, false), &signals(true, false));
        assert!(both.fakeout_confirmed);
        assert!(!both.vwap_flip_confirmed);
        assert!(both.any_triggered);
        assert_eq!(both.confirmed_patterns(), vec![PatternKind::Fakeout]);

        // Different patterns on each exchange do not confirm anything
        let crossed = ConfluenceResult::combine(&signals(true, false), &signals(false, true));
        assert!(!crossed.any_triggered);

        let all = ConfluenceResult::combine(&signals(true, true), &signals(true, true));
        assert_eq!(
            all.confirmed_patterns(),
            vec![PatternKind::Fakeout, PatternKind::VwapFlip]
        );
    }

    #[test]
    fn test_evaluate_both_exchanges_fakeout() {
        let evaluator = ConfluenceEvaluator::new(&DetectorConfig::default());
        let binance = bullish_fakeout_window(20.0);
        let bybit = bullish_fakeout_window(25.0);

        let eval = evaluator.evaluate(
            (Exchange::BinanceUs, &binance),
            (Exchange::Bybit, &bybit),
        );
        assert!(eval.confluence.fakeout_confirmed);
        assert!(eval.confluence.any_triggered);
        assert_eq!(eval.primary.fakeout.side, Side::Bullish);
        assert_eq!(eval.secondary.exchange, Exchange::Bybit);
        assert_eq!(eval.reference_candle().open_time, 24 * HOUR);
    }

    #[test]
    fn test_evaluate_weak_spike_on_one_exchange() {
        let evaluator = ConfluenceEvaluator::new(&DetectorConfig::default());
        let binance = bullish_fakeout_window(20.0);
        // 1.5x average on Bybit
        let bybit = bullish_fakeout_window(15.0);

        let eval = evaluator.evaluate(
            (Exchange::BinanceUs, &binance),
            (Exchange::Bybit, &bybit),
        );
        assert!(eval.primary.fakeout.triggered);
        assert!(!eval.secondary.fakeout.triggered);
        assert!(!eval.confluence.fakeout_confirmed);
    }
}
