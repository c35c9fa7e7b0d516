//! Per-exchange detection result.

use h1sig_core::{Candle, PatternKind, Side};
use serde::{Deserialize, Serialize};

/// Output of one detector call on one exchange's window.
///
/// Produced fresh per call; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Pattern that produced this result.
    pub pattern: PatternKind,
    pub triggered: bool,
    /// Bullish/Bearish when triggered, None otherwise.
    pub side: Side,
    /// Price level that defined the signal: the breached range bound for a
    /// fakeout, the second-half VWAP for a flip. 0 when not evaluated.
    pub level: f64,
    /// Last candle of the window (the candle under test).
    pub reference_candle: Candle,
    /// Volume baseline the candle was compared against.
    pub volume_baseline: f64,
}

impl DetectionResult {
    /// Result for a window that did not trigger or could not be evaluated.
    pub fn not_triggered(pattern: PatternKind, reference_candle: Candle) -> Self {
        Self {
            pattern,
            triggered: false,
            side: Side::None,
            level: 0.0,
            reference_candle,
            volume_baseline: 0.0,
        }
    }
}
