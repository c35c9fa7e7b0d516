//! Timing gate.
//!
//! Evaluation only runs in the last minutes of each hour. The gate is a
//! predicate over the wall-clock minute, re-evaluated every tick, so it
//! re-arms on its own when the minute wraps at 60.

use chrono::{DateTime, Timelike, Utc};

/// Gate state for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Before the gate minute: skip the tick entirely.
    Idle,
    /// At or after the gate minute: run the pipeline.
    Armed,
}

#[derive(Debug, Clone, Copy)]
pub struct TimingGate {
    gate_minute: u32,
}

impl TimingGate {
    pub fn new(gate_minute: u32) -> Self {
        Self { gate_minute }
    }

    /// State for minute-of-hour `minute`.
    pub fn state_at_minute(&self, minute: u32) -> GateState {
        if minute >= self.gate_minute {
            GateState::Armed
        } else {
            GateState::Idle
        }
    }

    pub fn state(&self, now: DateTime<Utc>) -> GateState {
        self.state_at_minute(now.minute())
    }

    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == GateState::Armed
    }
}
