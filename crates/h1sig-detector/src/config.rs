//! Detector configuration.

use crate::error::{DetectorError, DetectorResult};
use serde::{Deserialize, Serialize};

/// Largest lookback whose window (`lookback + 1`) fits one exchange request.
pub const MAX_LOOKBACK: usize = 999;

/// Configuration for pattern detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Number of closed candles before the candle under test.
    /// Windows hold `lookback + 1` candles.
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// Volume spike multiplier: the tested candle must exceed
    /// `avg_closed_volume * vol_spike_mult` for a fakeout.
    #[serde(default = "default_vol_spike_mult")]
    pub vol_spike_mult: f64,
}

fn default_lookback() -> usize {
    24 // 24 hours
}

fn default_vol_spike_mult() -> f64 {
    1.8
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
            vol_spike_mult: default_vol_spike_mult(),
        }
    }
}

impl DetectorConfig {
    /// Validate configuration values.
    ///
    /// Returns Err if:
    /// - lookback == 0 or lookback > MAX_LOOKBACK
    /// - vol_spike_mult is not a positive finite number
    pub fn validate(&self) -> DetectorResult<()> {
        if self.lookback == 0 {
            return Err(DetectorError::ConfigError(
                "lookback must be at least 1".to_string(),
            ));
        }

        if self.lookback > MAX_LOOKBACK {
            return Err(DetectorError::ConfigError(format!(
                "lookback ({}) exceeds {MAX_LOOKBACK}: exchanges return at most {} candles",
                self.lookback,
                MAX_LOOKBACK + 1
            )));
        }

        if !self.vol_spike_mult.is_finite() || self.vol_spike_mult <= 0.0 {
            return Err(DetectorError::ConfigError(format!(
                "vol_spike_mult ({}) must be positive",
                self.vol_spike_mult
            )));
        }

        Ok(())
    }

}
