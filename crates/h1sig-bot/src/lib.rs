//! Hourly BTC signal bot.
//!
//! Orchestrates one evaluation per poll tick:
//! - timing gate (last minutes of the hour only)
//! - concurrent candle and order-book fetches from Binance US and Bybit
//! - fakeout / VWAP-flip detection with cross-exchange confluence
//! - per-pattern alert dedup keyed by the reference candle close
//! - alert composition and delivery

pub mod app;
pub mod config;
pub mod dedup;
pub mod error;
pub mod gate;
pub mod pipeline;

pub use app::Application;
pub use config::{AppConfig, MarketConfig, ScheduleConfig};
pub use dedup::{AlertDedup, DedupDecision};
pub use error::{AppError, AppResult};
pub use gate::{GateState, TimingGate};
pub use pipeline::{Collaborators, TickOutcome, TickPipeline};
