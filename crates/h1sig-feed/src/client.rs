//! REST clients for exchange market data.
//!
//! - `BinanceClient`: Binance US `/api/v3/klines`
//! - `BybitClient`: Bybit v5 `/v5/market/kline` and `/v5/market/orderbook`
//!
//! Every request is bounded by the HTTP client timeout and by an outer
//! `tokio::time::timeout`, so a silent peer can never stall the poll loop.

use crate::error::{FeedError, FeedResult};
use crate::normalizer::{parse_binance_klines, parse_bybit_klines, parse_bybit_orderbook};
use crate::source::{BoxFuture, CandleSource, OrderbookSource};
use h1sig_core::{Candle, Exchange, OrderflowSnapshot};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Default timeout for exchange requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Binance interval for hourly klines.
const BINANCE_INTERVAL: &str = "1h";

/// Bybit interval for hourly klines (minutes).
const BYBIT_INTERVAL: &str = "60";

/// Bybit product category.
const BYBIT_CATEGORY: &str = "linear";

/// Run `fut` with a deadline, mapping expiry to `FeedError::Timeout`.
pub async fn with_timeout<T, F>(timeout: Duration, what: &str, fut: F) -> FeedResult<T>
where
    F: Future<Output = FeedResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(FeedError::Timeout(format!(
            "{what} exceeded {}ms",
            timeout.as_millis()
        ))),
    }
}

fn build_client(timeout: Duration) -> FeedResult<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))
}

/// GET `url` with `query` and return the raw body on 2xx.
async fn get_body(client: &Client, url: &str, query: &[(&str, String)]) -> FeedResult<Vec<u8>> {
    let response = client.get(url).query(query).send().await.map_err(|e| {
        if e.is_timeout() {
            FeedError::Timeout(format!("{url}: {e}"))
        } else {
            FeedError::Network(format!("{url}: {e}"))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FeedError::Network(format!("HTTP {status} from {url}: {body}")));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| FeedError::Network(format!("Failed to read body from {url}: {e}")))?;

    debug!(url = %url, bytes = bytes.len(), "Received reply");
    Ok(bytes.to_vec())
}

/// Binance US kline client.
pub struct BinanceClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl BinanceClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g., "https://api.binance.us")
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FeedResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
            timeout,
        })
    }

    /// Fetch hourly candles, oldest first.
    pub async fn fetch_klines(&self, symbol: &str, limit: usize) -> FeedResult<Vec<Candle>> {
        let url = format!("{}/api/v3/klines", self.base_url.trim_end_matches('/'));
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", BINANCE_INTERVAL.to_string()),
            ("limit", limit.to_string()),
        ];

        let body = with_timeout(self.timeout, "binance klines", get_body(&self.client, &url, &query))
            .await?;
        parse_binance_klines(&body)
    }
}

impl CandleSource for BinanceClient {
    fn exchange(&self) -> Exchange {
        Exchange::BinanceUs
    }

    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, FeedResult<Vec<Candle>>> {
        Box::pin(self.fetch_klines(symbol, limit))
    }
}

/// Bybit v5 client (linear perpetuals).
pub struct BybitClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl BybitClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g., "https://api.bybit.com")
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FeedResult<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
            timeout,
        })
    }

    /// Fetch hourly candles in Bybit's newest-first order.
    pub async fn fetch_klines(&self, symbol: &str, limit: usize) -> FeedResult<Vec<Candle>> {
        let url = format!("{}/v5/market/kline", self.base_url.trim_end_matches('/'));
        let query = [
            ("category", BYBIT_CATEGORY.to_string()),
            ("symbol", symbol.to_string()),
            ("interval", BYBIT_INTERVAL.to_string()),
            ("limit", limit.to_string()),
        ];

        let body = with_timeout(self.timeout, "bybit klines", get_body(&self.client, &url, &query))
            .await?;
        parse_bybit_klines(&body)
    }

    /// Fetch the order book and sum bid/ask sizes over `depth` levels.
    pub async fn fetch_depth(&self, symbol: &str, depth: usize) -> FeedResult<OrderflowSnapshot> {
        let url = format!("{}/v5/market/orderbook", self.base_url.trim_end_matches('/'));
        let query = [
            ("category", BYBIT_CATEGORY.to_string()),
            ("symbol", symbol.to_string()),
            ("limit", depth.to_string()),
        ];

        let body = with_timeout(
            self.timeout,
            "bybit orderbook",
            get_body(&self.client, &url, &query),
        )
        .await?;
        parse_bybit_orderbook(&body)
    }
}

impl CandleSource for BybitClient {
    fn exchange(&self) -> Exchange {
        Exchange::Bybit
    }

    fn fetch_candles<'a>(
        &'a self,
        symbol: &'a str,
        limit: usize,
    ) -> BoxFuture<'a, FeedResult<Vec<Candle>>> {
        Box::pin(self.fetch_klines(symbol, limit))
    }
}

impl OrderbookSource for BybitClient {
    fn fetch_orderbook<'a>(
        &'a self,
        symbol: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, FeedResult<OrderflowSnapshot>> {
        Box::pin(self.fetch_depth(symbol, depth))
    }
}
