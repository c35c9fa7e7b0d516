//! Market data collaborators for h1sig.
//!
//! - REST clients for Binance US klines, Bybit v5 klines and the Bybit order book
//! - Candle normalization: timestamp units, ordering, window length
//! - `CandleSource` / `OrderbookSource` traits so the pipeline can be driven
//!   by in-memory sources in tests

pub mod client;
pub mod error;
pub mod normalizer;
pub mod source;

pub use client::{with_timeout, BinanceClient, BybitClient, DEFAULT_TIMEOUT};
pub use error::{FeedError, FeedResult};
pub use normalizer::{
    normalize_epoch_secs, parse_binance_klines, parse_bybit_klines, parse_bybit_orderbook,
    CandleNormalizer,
};
pub use source::{BoxFuture, CandleSource, MockCandleSource, MockOrderbookSource, OrderbookSource};
