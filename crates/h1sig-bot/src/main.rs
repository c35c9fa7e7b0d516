//! h1sig Hourly Signal Bot - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Hourly fakeout / VWAP-flip confluence alert bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via H1SIG_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    h1sig_telemetry::init_logging()?;

    info!("Starting h1sig bot v{}", env!("CARGO_PKG_VERSION"));

    let config = h1sig_bot::AppConfig::load(args.config)?;
    info!(
        symbol = %config.market.symbol,
        binance_url = %config.market.binance_url,
        bybit_url = %config.market.bybit_url,
        "Configuration loaded"
    );

    let app = h1sig_bot::Application::new(config)?;
    app.run().await?;

    Ok(())
}
