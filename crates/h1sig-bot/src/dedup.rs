//! Alert dedup state machine.
//!
//! Remembers, per pattern, the close timestamp of the last candle an alert
//! was dispatched for. State is owned by the poll loop and passed into each
//! tick; it lives for the process lifetime and is never persisted.
//!
//! Keys are committed on the decision to dispatch, not on delivery, so a
//! transport outage does not produce repeated attempts for the same candle.

use h1sig_core::PatternKind;

/// Outcome of a dedup check for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupDecision {
    /// Confirmed patterns not yet alerted for this candle.
    pub fresh: Vec<PatternKind>,
    /// Confirmed patterns already alerted for this candle.
    pub suppressed: Vec<PatternKind>,
}

impl DedupDecision {
    pub fn should_dispatch(&self) -> bool {
        !self.fresh.is_empty()
    }
}

/// Per-pattern last-alerted candle close.
#[derive(Debug, Clone, Default)]
pub struct AlertDedup {
    fakeout: Option<i64>,
    vwap_flip: Option<i64>,
}

impl AlertDedup {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, pattern: PatternKind) -> &mut Option<i64> {
        match pattern {
            PatternKind::Fakeout => &mut self.fakeout,
            PatternKind::VwapFlip => &mut self.vwap_flip,
        }
    }

    pub fn last_alerted(&self, pattern: PatternKind) -> Option<i64> {
        match pattern {
            PatternKind::Fakeout => self.fakeout,
            PatternKind::VwapFlip => self.vwap_flip,
        }
    }

    /// Split `confirmed` into fresh and suppressed patterns for the candle
    /// closing at `candle_close`, committing the fresh ones.
    pub fn claim(&mut self, confirmed: &[PatternKind], candle_close: i64) -> DedupDecision {
        let mut decision = DedupDecision::default();
        for &pattern in confirmed {
            let slot = self.slot(pattern);
            if *slot == Some(candle_close) {
                decision.suppressed.push(pattern);
            } else {
                *slot = Some(candle_close);
                decision.fresh.push(pattern);
            }
        }
        decision
    }
}
