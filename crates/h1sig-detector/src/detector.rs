//! Pattern detector trait.

use crate::signal::DetectionResult;
use h1sig_core::{CandleWindow, PatternKind};

/// A stateless predicate over one exchange's candle window.
///
/// Implementations never look across exchanges; confluence is the
/// evaluator's job.
pub trait PatternDetector: Send + Sync {
    /// Pattern class this detector reports.
    fn kind(&self) -> PatternKind;

    /// Evaluate the last candle of `window` against the candles before it.
    fn detect(&self, window: &CandleWindow) -> DetectionResult;
}
