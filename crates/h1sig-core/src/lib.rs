//! Core domain types for the h1sig hourly signal bot.
//!
//! This crate provides the value types shared by every stage of the pipeline:
//! - `Candle`, `CandleWindow`: canonical OHLCV representation, oldest first
//! - `OrderflowSnapshot`: aggregate bid/ask volume from an order book
//! - `Exchange`, `PatternKind`, `Side`: small enums used in results and alerts

pub mod candle;
pub mod error;
pub mod types;

pub use candle::{Candle, CandleWindow, CANDLE_INTERVAL_SECS};
pub use error::{CoreError, Result};
pub use types::{Exchange, OrderflowSnapshot, PatternKind, Side};
