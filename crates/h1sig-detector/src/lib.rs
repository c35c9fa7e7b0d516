//! Pattern detection for the h1sig hourly signal bot.
//!
//! Two stateless detectors run over one exchange's candle window:
//! - Fakeout: excursion beyond the prior range that closes back inside on a volume spike
//! - VWAP flip: close on the far side of the second-half VWAP in the direction of its slope
//!
//! The confluence evaluator confirms a pattern only when both exchanges
//! trigger it, and raises an alert when any pattern is confirmed.

pub mod config;
pub mod confluence;
pub mod detector;
pub mod error;
pub mod fakeout;
pub mod indicators;
pub mod signal;
pub mod vwap_flip;

pub use config::{DetectorConfig, MAX_LOOKBACK};
pub use confluence::{ConfluenceEvaluation, ConfluenceEvaluator, ConfluenceResult, ExchangeSignals};
pub use detector::PatternDetector;
pub use error::{DetectorError, DetectorResult};
pub use fakeout::FakeoutDetector;
pub use indicators::{sma, vwap};
pub use signal::DetectionResult;
pub use vwap_flip::VwapFlipDetector;
