//! Stateless indicators over candle slices.
//!
//! Both return `None` for "cannot evaluate". Callers must never read `None`
//! as zero.

use h1sig_core::Candle;

/// Volume-weighted average of typical price `(high + low + close) / 3`.
///
/// `None` when total volume is zero (including an empty slice).
pub fn vwap(candles: &[Candle]) -> Option<f64> {
    let (total_pv, total_vol) = candles.iter().fold((0.0, 0.0), |(pv, vol), c| {
        (pv + c.typical_price() * c.volume, vol + c.volume)
    });

    if total_vol == 0.0 {
        None
    } else {
        Some(total_pv / total_vol)
    }
}

/// Arithmetic mean of the last `n` values.
///
/// `None` when `n == 0` or fewer than `n` values are available.
pub fn sma(values: &[f64], n: usize) -> Option<f64> {
    if n == 0 || values.len() < n {
        return None;
    }
    let tail = &values[values.len() - n..];
    Some(tail.iter().sum::<f64>() / n as f64)
}
