//! Candle normalization.
//!
//! Turns raw exchange replies into the canonical `Candle` shape:
//! - timestamps normalized to seconds (exchanges reply in milliseconds)
//! - ordering normalized to oldest first (Bybit replies newest first)
//! - windows trimmed to exactly `lookback + 1` candles
//!
//! Any shape mismatch is a `FeedError::DataFormat`; the caller skips the tick.

use crate::error::{FeedError, FeedResult};
use h1sig_core::{Candle, CandleWindow, OrderflowSnapshot};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Epoch values at or above this magnitude are milliseconds.
///
/// 1e11 seconds is year 5138; 1e11 milliseconds is March 1973.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Convert an epoch timestamp in seconds or milliseconds to seconds.
pub fn normalize_epoch_secs(raw: i64) -> i64 {
    if raw.abs() >= MILLIS_THRESHOLD {
        raw / 1000
    } else {
        raw
    }
}

/// Bybit v5 response envelope.
#[derive(Debug, Deserialize)]
struct BybitEnvelope<T> {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    result: Option<T>,
}

impl<T> BybitEnvelope<T> {
    fn into_result(self) -> FeedResult<T> {
        if self.ret_code != 0 {
            return Err(FeedError::DataFormat(format!(
                "bybit retCode {}: {}",
                self.ret_code, self.ret_msg
            )));
        }
        self.result
            .ok_or_else(|| FeedError::DataFormat("bybit reply missing result".to_string()))
    }
}

/// `result` of `/v5/market/kline`.
#[derive(Debug, Deserialize)]
struct BybitKlineResult {
    /// `[startTime, open, high, low, close, volume, turnover]`, all strings.
    list: Vec<Vec<Value>>,
}

/// `result` of `/v5/market/orderbook`.
#[derive(Debug, Deserialize)]
struct BybitOrderbookResult {
    /// Bids as `[price, size]`.
    b: Vec<[String; 2]>,
    /// Asks as `[price, size]`.
    a: Vec<[String; 2]>,
}

fn value_as_f64(v: &Value, field: &str) -> FeedResult<f64> {
    let parsed = match v {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed
        .filter(|x| x.is_finite())
        .ok_or_else(|| FeedError::DataFormat(format!("invalid {field}: {v}")))
}

fn value_as_i64(v: &Value, field: &str) -> FeedResult<i64> {
    let parsed = match v {
        Value::String(s) => s.parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    parsed.ok_or_else(|| FeedError::DataFormat(format!("invalid {field}: {v}")))
}

/// Decode one `[time, open, high, low, close, volume, ...]` row.
fn candle_from_row(row: &[Value]) -> FeedResult<Candle> {
    if row.len() < 6 {
        return Err(FeedError::DataFormat(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }

    Ok(Candle::new(
        normalize_epoch_secs(value_as_i64(&row[0], "open_time")?),
        value_as_f64(&row[1], "open")?,
        value_as_f64(&row[2], "high")?,
        value_as_f64(&row[3], "low")?,
        value_as_f64(&row[4], "close")?,
        value_as_f64(&row[5], "volume")?,
    ))
}

/// Parse a Binance `/api/v3/klines` body (array of rows, oldest first).
pub fn parse_binance_klines(body: &[u8]) -> FeedResult<Vec<Candle>> {
    let rows: Vec<Vec<Value>> = serde_json::from_slice(body)?;
    rows.iter().map(|r| candle_from_row(r)).collect()
}

/// Parse a Bybit `/v5/market/kline` body. Rows are returned in reply order.
pub fn parse_bybit_klines(body: &[u8]) -> FeedResult<Vec<Candle>> {
    let envelope: BybitEnvelope<BybitKlineResult> = serde_json::from_slice(body)?;
    let result = envelope.into_result()?;
    result.list.iter().map(|r| candle_from_row(r)).collect()
}

/// Parse a Bybit `/v5/market/orderbook` body into aggregate volumes.
pub fn parse_bybit_orderbook(body: &[u8]) -> FeedResult<OrderflowSnapshot> {
    let envelope: BybitEnvelope<BybitOrderbookResult> = serde_json::from_slice(body)?;
    let book = envelope.into_result()?;

    let sum = |levels: &[[String; 2]], side: &str| -> FeedResult<f64> {
        levels.iter().try_fold(0.0, |acc, [_, size]| {
            size.parse::<f64>()
                .map(|s| acc + s)
                .map_err(|e| FeedError::DataFormat(format!("invalid {side} size {size}: {e}")))
        })
    };

    Ok(OrderflowSnapshot::new(sum(&book.b, "bid")?, sum(&book.a, "ask")?))
}

/// Builds fixed-length candle windows from decoded candles.
#[derive(Debug, Clone, Copy)]
pub struct CandleNormalizer {
    lookback: usize,
}

impl CandleNormalizer {
    pub fn new(lookback: usize) -> Self {
        Self { lookback }
    }

    /// Number of candles in every produced window (`lookback + 1`).
    pub fn window_len(&self) -> usize {
        self.lookback + 1
    }

    /// Order oldest first, trim to the most recent `lookback + 1` candles and
    /// validate strict ordering.
    pub fn window(&self, mut candles: Vec<Candle>) -> FeedResult<CandleWindow> {
        let need = self.window_len();
        if candles.len() < need {
            return Err(FeedError::DataFormat(format!(
                "received {} candles, need {}",
                candles.len(),
                need
            )));
        }

        let newest_first = match (candles.first(), candles.last()) {
            (Some(first), Some(last)) => first.open_time > last.open_time,
            _ => false,
        };
        if newest_first {
            debug!("Reversing newest-first candle reply");
            candles.reverse();
        }

        let excess = candles.len() - need;
        candles.drain(..excess);

        Ok(CandleWindow::new(candles)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINANCE_BODY: &str = r#"[
        [1700000000000, "100.0", "110.0", "95.0", "105.0", "12.5", 1700003599999, "0", 10, "0", "0", "0"],
        [1700003600000, "105.0", "112.0", "101.0", "111.0", "8.0", 1700007199999, "0", 10, "0", "0", "0"],
        [1700007200000, "111.0", "115.0", "109.0", "113.0", "20.0", 1700010799999, "0", 10, "0", "0", "0"]
    ]"#;

    const BYBIT_BODY: &str = r#"{
        "retCode": 0,
        "retMsg": "OK",
        "result": {
            "category": "linear",
            "symbol": "BTCUSDT",
            "list": [
                ["1700007200000", "111.0", "115.0", "109.0", "113.0", "20.0", "2260.0"],
                ["1700003600000", "105.0", "112.0", "101.0", "111.0", "8.0", "888.0"],
                ["1700000000000", "100.0", "110.0", "95.0", "105.0", "12.5", "1312.5"]
            ]
        }
    }"#;

    #[test]
    fn test_normalize_epoch_units() {
        assert_eq!(normalize_epoch_secs(1_700_000_000_000), 1_700_000_000);
        assert_eq!(normalize_epoch_secs(1_700_000_000), 1_700_000_000);
    }

    #[test]
    fn test_parse_binance_klines() {
        let candles = parse_binance_klines(BINANCE_BODY.as_bytes()).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].open_time, 1_700_000_000);
        assert_eq!(candles[0].volume, 12.5);
        assert_eq!(candles[2].close, 113.0);
    }

    #[test]
    fn test_bybit_reply_is_reversed_by_normalizer() {
        let candles = parse_bybit_klines(BYBIT_BODY.as_bytes()).unwrap();
        assert_eq!(candles[0].open_time, 1_700_007_200);

        let window = CandleNormalizer::new(2).window(candles).unwrap();
        let times: Vec<i64> = window.candles().iter().map(|c| c.open_time).collect();
        assert_eq!(times, vec![1_700_000_000, 1_700_003_600, 1_700_007_200]);
    }

    #[test]
    fn test_both_exchanges_normalize_identically() {
        let normalizer = CandleNormalizer::new(2);
        let binance = normalizer
            .window(parse_binance_klines(BINANCE_BODY.as_bytes()).unwrap())
            .unwrap();
        let bybit = normalizer
            .window(parse_bybit_klines(BYBIT_BODY.as_bytes()).unwrap())
            .unwrap();
        assert_eq!(binance, bybit);
    }

    #[test]
    fn test_window_trims_to_most_recent() {
        let candles = parse_binance_klines(BINANCE_BODY.as_bytes()).unwrap();
        let window = CandleNormalizer::new(1).window(candles).unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(window.last().open_time, 1_700_007_200);
    }

    #[test]
    fn test_short_reply_is_data_format_error() {
        let candles = parse_binance_klines(BINANCE_BODY.as_bytes()).unwrap();
        let err = CandleNormalizer::new(24).window(candles).unwrap_err();
        assert!(err.is_data_format());
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(parse_binance_klines(b"{\"code\": -1121}")
            .unwrap_err()
            .is_data_format());
        assert!(parse_binance_klines(br#"[[1700000000000, "abc", "1", "1", "1", "1"]]"#)
            .unwrap_err()
            .is_data_format());
        assert!(parse_binance_klines(br#"[[1700000000000, "1", "1"]]"#)
            .unwrap_err()
            .is_data_format());
    }

    #[test]
    fn test_bybit_error_code() {
        let body = br#"{"retCode": 10001, "retMsg": "params error", "result": {}}"#;
        let err = parse_bybit_klines(body).unwrap_err();
        assert!(err.is_data_format());
        assert!(err.to_string().contains("10001"));
    }

    #[test]
    fn test_duplicate_timestamps_rejected() {
        let body = br#"[
            [1700000000000, "1", "1", "1", "1", "1"],
            [1700000000000, "1", "1", "1", "1", "1"]
        ]"#;
        let candles = parse_binance_klines(body).unwrap();
        assert!(CandleNormalizer::new(1)
            .window(candles)
            .unwrap_err()
            .is_data_format());
    }

    #[test]
    fn test_parse_bybit_orderbook() {
        let body = br#"{
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "s": "BTCUSDT",
                "b": [["65000.0", "1.5"], ["64999.5", "2.5"]],
                "a": [["65000.5", "1.0"]],
                "ts": 1700000000000,
                "u": 1
            }
        }"#;
        let snap = parse_bybit_orderbook(body).unwrap();
        assert_eq!(snap.bid_volume, 4.0);
        assert_eq!(snap.ask_volume, 1.0);
        assert_eq!(snap.delta(), 3.0);
        assert_eq!(snap.imbalance_pct(), 80.0);
    }
}
