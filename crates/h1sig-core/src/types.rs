//! Common data types: exchanges, patterns, order-flow snapshot.

use serde::{Deserialize, Serialize};

/// Exchanges sampled for confluence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exchange {
    BinanceUs,
    Bybit,
}

impl Exchange {
    /// Metric/log label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BinanceUs => "binance_us",
            Self::Bybit => "bybit",
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BinanceUs => write!(f, "BinanceUS"),
            Self::Bybit => write!(f, "Bybit"),
        }
    }
}

/// Pattern classes evaluated each tick. Also the dedup key tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Fakeout,
    VwapFlip,
}

impl PatternKind {
    pub const ALL: [PatternKind; 2] = [PatternKind::Fakeout, PatternKind::VwapFlip];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Fakeout => "fakeout",
            Self::VwapFlip => "vwap_flip",
        }
    }
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fakeout => write!(f, "Fakeout"),
            Self::VwapFlip => write!(f, "VWAP Flip"),
        }
    }
}

/// Direction of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Bullish,
    Bearish,
    #[default]
    None,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "bullish"),
            Self::Bearish => write!(f, "bearish"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Aggregate order-book volumes.
///
/// Supplementary context for alerts only; never an input to the trigger
/// decision. Recomputed every gated tick, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrderflowSnapshot {
    /// Sum of bid sizes over the fetched depth.
    pub bid_volume: f64,
    /// Sum of ask sizes over the fetched depth.
    pub ask_volume: f64,
}

impl OrderflowSnapshot {
    pub fn new(bid_volume: f64, ask_volume: f64) -> Self {
        Self {
            bid_volume,
            ask_volume,
        }
    }

    /// bid - ask.
    pub fn delta(&self) -> f64 {
        self.bid_volume - self.ask_volume
    }

    /// bid / (bid + ask) * 100, or 0 when both sides are empty.
    pub fn imbalance_pct(&self) -> f64 {
        let total = self.bid_volume + self.ask_volume;
        if total == 0.0 {
            0.0
        } else {
            self.bid_volume / total * 100.0
        }
    }
}
