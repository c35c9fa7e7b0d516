//! Main application and poll loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use h1sig_feed::{BinanceClient, BybitClient};
use h1sig_health::{run_server, HealthState};
use h1sig_notify::{DryRunNotifier, Notifier, TelegramNotifier};
use h1sig_telemetry::Metrics;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::dedup::AlertDedup;
use crate::error::AppResult;
use crate::pipeline::{Collaborators, TickOutcome, TickPipeline};

/// Main application.
pub struct Application {
    config: AppConfig,
    pipeline: TickPipeline,
}

impl Application {
    /// Create the application with the real exchange and notification clients.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let schedule = &config.schedule;

        let binance = BinanceClient::new(&config.market.binance_url, schedule.request_timeout())?;
        let bybit = BybitClient::new(&config.market.bybit_url, schedule.request_timeout())?;
        let orderbook = BybitClient::new(&config.market.bybit_url, schedule.orderbook_timeout())?;

        let notifier: Arc<dyn Notifier> =
            match TelegramNotifier::from_config(&config.telegram, schedule.request_timeout())? {
                Some(telegram) => Arc::new(telegram),
                None => Arc::new(DryRunNotifier::new()),
            };

        let io = Collaborators {
            primary: Arc::new(binance),
            secondary: Arc::new(bybit),
            orderbook: Arc::new(orderbook),
            notifier,
        };
        Ok(Self::with_collaborators(config, io))
    }

    /// Create the application over explicit collaborators.
    pub fn with_collaborators(config: AppConfig, io: Collaborators) -> Self {
        let pipeline = TickPipeline::new(
            config.market.symbol.clone(),
            config.market.orderbook_depth,
            config.schedule.gate_minute,
            &config.detector,
            io,
        );
        Self { config, pipeline }
    }

    /// Run the poll loop until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run the poll loop until `shutdown` resolves.
    ///
    /// Ticks never overlap: the next tick starts only after the current
    /// one (including its dispatch attempt) has finished. A failed tick is
    /// followed by `error_backoff_secs` of sleep, then the loop resumes.
    pub async fn run_until<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()>,
    {
        info!(
            symbol = %self.config.market.symbol,
            poll_interval_secs = self.config.schedule.poll_interval_secs,
            gate_minute = self.config.schedule.gate_minute,
            lookback = self.config.detector.lookback,
            vol_spike_mult = self.config.detector.vol_spike_mult,
            dry_run = self.config.is_dry_run(),
            "Starting application"
        );

        if self.config.health.enabled {
            let state = HealthState::new(self.config.market.symbol.as_str());
            let health_config = self.config.health.clone();
            tokio::spawn(async move {
                if let Err(e) = run_server(state, health_config).await {
                    error!(error = %e, "Health server failed");
                }
            });
        }

        let mut dedup = AlertDedup::new();
        let mut interval = tokio::time::interval(self.config.schedule.poll_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        info!("Entering poll loop");
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.tick(&mut dedup).await {
                        continue;
                    }
                    // Failed tick: back off before retrying.
                    let backoff = self.config.schedule.error_backoff();
                    tokio::select! {
                        _ = tokio::time::sleep(backoff) => interval.reset(),
                        _ = &mut shutdown => break,
                    }
                }
                _ = &mut shutdown => break,
            }
        }

        info!("Shutdown requested, stopping poll loop");
        Ok(())
    }

    /// Run one tick; returns false if it failed.
    async fn tick(&self, dedup: &mut AlertDedup) -> bool {
        let started = Instant::now();
        let result = self.pipeline.run_tick(dedup, Utc::now()).await;

        match &result {
            Ok(TickOutcome::GateClosed) => {
                debug!("Gate closed, skipping tick");
            }
            Ok(outcome) => {
                Metrics::tick_duration(started.elapsed().as_secs_f64() * 1000.0);
                info!(outcome = outcome.label(), details = ?outcome, "Tick complete");
            }
            Err(e) => {
                warn!(
                    error = %e,
                    backoff_secs = self.config.schedule.error_backoff_secs,
                    "Tick failed, backing off"
                );
            }
        }

        match result {
            Ok(outcome) => {
                Metrics::tick(outcome.label());
                true
            }
            Err(_) => {
                Metrics::tick("failed");
                false
            }
        }
    }
}
