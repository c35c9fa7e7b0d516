//! Alert message composition.
//!
//! Order flow is context only: a missing snapshot renders as "unavailable"
//! and never changes whether an alert is built.

use chrono::{DateTime, Utc};
use h1sig_core::{OrderflowSnapshot, PatternKind};
use h1sig_detector::{ConfluenceEvaluation, ExchangeSignals};
use std::fmt::Write;

const CHECK: &str = "✅";
const CROSS: &str = "❌";

fn flag(on: bool) -> &'static str {
    if on {
        CHECK
    } else {
        CROSS
    }
}

/// Builds Telegram Markdown alert bodies.
#[derive(Debug, Clone)]
pub struct AlertComposer {
    symbol: String,
    gate_minute: u32,
}

impl AlertComposer {
    pub fn new(symbol: impl Into<String>, gate_minute: u32) -> Self {
        Self {
            symbol: symbol.into(),
            gate_minute,
        }
    }

    /// Render the alert for `eval` at `now`.
    pub fn compose(
        &self,
        eval: &ConfluenceEvaluation,
        orderflow: Option<&OrderflowSnapshot>,
        now: DateTime<Utc>,
    ) -> String {
        let mut msg = String::new();

        // Writing to a String cannot fail.
        let _ = writeln!(msg, "⚡ *{} 1H Signal Alert* ⚡", self.symbol);
        let _ = writeln!(msg, "Time (UTC): {}", now.format("%Y-%m-%d %H:%M"));
        msg.push('\n');

        let [primary, secondary] = eval.exchanges();
        let _ = writeln!(
            msg,
            "Exchange Confluence: {} {}  {} {}",
            primary.exchange,
            flag(primary.any_triggered()),
            secondary.exchange,
            flag(secondary.any_triggered()),
        );
        for signals in eval.exchanges() {
            msg.push_str(&exchange_line(signals));
            msg.push('\n');
        }

        for pattern in PatternKind::ALL {
            if eval.confluence.is_confirmed(pattern) {
                let result = primary.get(pattern);
                let _ = writeln!(
                    msg,
                    "{pattern}: {CHECK} ({} @ {:.2})",
                    result.side, result.level
                );
            } else {
                let _ = writeln!(msg, "{pattern}: {CROSS}");
            }
        }
        msg.push('\n');

        match orderflow {
            Some(of) => {
                let _ = writeln!(
                    msg,
                    "Order Flow Delta: {:.2} | Imbalance: {:.1}%",
                    of.delta(),
                    of.imbalance_pct()
                );
            }
            None => msg.push_str("Order Flow Delta: unavailable | Imbalance: unavailable\n"),
        }
        msg.push('\n');

        let _ = write!(
            msg,
            "_Signal generated ~{} minutes before hourly close._",
            60u32.saturating_sub(self.gate_minute)
        );
        msg
    }
}

fn exchange_line(signals: &ExchangeSignals) -> String {
    let parts: Vec<String> = PatternKind::ALL
        .into_iter()
        .map(|p| format!("{p} {}", flag(signals.triggered(p))))
        .collect();
    format!("{}: {}", signals.exchange, parts.join(" | "))
}
