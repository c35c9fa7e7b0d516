//! Application configuration.
//!
//! Precedence: defaults < TOML file < environment. Read once at startup.

use crate::error::{AppError, AppResult};
use h1sig_detector::DetectorConfig;
use h1sig_health::HealthConfig;
use h1sig_notify::TelegramConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default config file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Trading pair and exchange endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Symbol shared by both exchanges (e.g., "BTCUSDT").
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Order-book levels per side for the order-flow snapshot.
    #[serde(default = "default_orderbook_depth")]
    pub orderbook_depth: usize,
    #[serde(default = "default_binance_url")]
    pub binance_url: String,
    #[serde(default = "default_bybit_url")]
    pub bybit_url: String,
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}

fn default_orderbook_depth() -> usize {
    200
}

fn default_binance_url() -> String {
    "https://api.binance.us".to_string()
}

fn default_bybit_url() -> String {
    "https://api.bybit.com".to_string()
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            orderbook_depth: default_orderbook_depth(),
            binance_url: default_binance_url(),
            bybit_url: default_bybit_url(),
        }
    }
}

/// Poll loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Poll interval (seconds). Default: 60.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// First minute of the hour at which evaluation runs. Default: 50.
    #[serde(default = "default_gate_minute")]
    pub gate_minute: u32,
    /// Sleep after a failed tick (seconds). Default: 60.
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,
    /// Candle fetch and notification timeout (seconds). Default: 10.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Order-book fetch timeout (seconds). Default: 5.
    #[serde(default = "default_orderbook_timeout_secs")]
    pub orderbook_timeout_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_gate_minute() -> u32 {
    50
}

fn default_error_backoff_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_orderbook_timeout_secs() -> u64 {
    5
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            gate_minute: default_gate_minute(),
            error_backoff_secs: default_error_backoff_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            orderbook_timeout_secs: default_orderbook_timeout_secs(),
        }
    }
}

impl ScheduleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn orderbook_timeout(&self) -> Duration {
        Duration::from_secs(self.orderbook_timeout_secs)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid {key}={value:?}: {e}")))
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Path: `path` argument > `H1SIG_CONFIG` env var > `config/default.toml`.
    /// A missing file means defaults. Environment overrides are applied and
    /// the result is validated.
    pub fn load(path: Option<String>) -> AppResult<Self> {
        let config_path = path
            .or_else(|| std::env::var("H1SIG_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&config_path).exists() {
            Self::from_file(&config_path)?
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply environment-style overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(v);
        }
        if let Some(v) = lookup("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(v);
        }
        if let Some(v) = lookup("SYMBOL") {
            self.market.symbol = v.trim().to_uppercase();
        }
        if let Some(v) = lookup("POLL_INTERVAL_SECS") {
            self.schedule.poll_interval_secs = parse_env("POLL_INTERVAL_SECS", &v)?;
        }
        if let Some(v) = lookup("LOOKBACK") {
            self.detector.lookback = parse_env("LOOKBACK", &v)?;
        }
        if let Some(v) = lookup("VOL_SPIKE_MULT") {
            self.detector.vol_spike_mult = parse_env("VOL_SPIKE_MULT", &v)?;
        }
        if let Some(v) = lookup("GATE_MINUTE") {
            self.schedule.gate_minute = parse_env("GATE_MINUTE", &v)?;
        }
        if let Some(v) = lookup("PORT") {
            self.health.port = parse_env("PORT", &v)?;
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// A missing notification destination is not an error (dry-run).
    pub fn validate(&self) -> AppResult<()> {
        self.detector.validate()?;

        if self.market.symbol.trim().is_empty() {
            return Err(AppError::Config("symbol must not be empty".to_string()));
        }
        if self.market.orderbook_depth == 0 {
            return Err(AppError::Config("orderbook_depth must be at least 1".to_string()));
        }
        if self.schedule.gate_minute > 59 {
            return Err(AppError::Config(format!(
                "gate_minute ({}) must be within 0..=59",
                self.schedule.gate_minute
            )));
        }
        if self.schedule.poll_interval_secs == 0 {
            return Err(AppError::Config(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.schedule.request_timeout_secs == 0 || self.schedule.orderbook_timeout_secs == 0 {
            return Err(AppError::Config("timeouts must be at least 1 second".to_string()));
        }
        Ok(())
    }

    /// Whether alerts are only logged.
    pub fn is_dry_run(&self) -> bool {
        self.telegram.destination().is_none()
    }
}
