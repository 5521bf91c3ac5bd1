//! Textbook technical indicators over a chronological price slice.
//!
//! Every function tolerates slices shorter than its nominal window by falling
//! back to the points that are available. Empty input yields a defined
//! neutral value instead of an error; rejecting empty series is the caller's
//! job.

use crate::application::stats::{mean, tail};

pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST_PERIOD: usize = 12;
pub const MACD_SLOW_PERIOD: usize = 26;
pub const SUPPORT_RESISTANCE_LOOKBACK: usize = 30;

/// RSI reported when there is not enough history to compute it.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Rounds to `decimals` places from the exact binary value, ties to even.
///
/// `1.045` is stored just below the half and rounds to `1.04`; scaling by
/// a power of ten first would push it over.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals as usize, value)
        .parse::<f64>()
        .unwrap_or(value)
}

/// Simple moving average of the last `period` prices (all prices if fewer).
pub fn sma(prices: &[f64], period: usize) -> f64 {
    mean(tail(prices, period))
}

/// Exponential moving average seeded with the first price.
///
/// Falls back to the simple mean when there are fewer than `period` prices.
pub fn ema(prices: &[f64], period: usize) -> f64 {
    let Some((&first, rest)) = prices.split_first() else {
        return 0.0;
    };
    if prices.len() < period {
        return mean(prices);
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    rest.iter().fold(first, |ema, &price| {
        price * multiplier + ema * (1.0 - multiplier)
    })
}

/// Relative Strength Index from simple average gains and losses over the last
/// `period` deltas. Rounded to 2 decimals.
pub fn rsi(prices: &[f64], period: usize) -> f64 {
    if prices.len() < period + 1 {
        return NEUTRAL_RSI;
    }

    let window = tail(prices, period + 1);
    let (gains, losses) = window
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gains, losses), delta| {
            if delta > 0.0 {
                (gains + delta, losses)
            } else {
                (gains, losses - delta)
            }
        });

    let deltas = (window.len() - 1) as f64;
    let avg_gain = gains / deltas;
    let avg_loss = losses / deltas;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    round_to(100.0 - (100.0 / (1.0 + rs)), 2)
}

/// `ema(fast) - ema(slow)`, zero until `slow` prices are available.
/// Rounded to 2 decimals.
pub fn macd(prices: &[f64], fast: usize, slow: usize) -> f64 {
    if prices.len() < slow {
        return 0.0;
    }
    round_to(ema(prices, fast) - ema(prices, slow), 2)
}

/// Lowest and highest price of the last 30 points, rounded to 2 decimals.
/// Returns `(0.0, 0.0)` for an empty slice.
pub fn support_resistance(prices: &[f64]) -> (f64, f64) {
    if prices.is_empty() {
        return (0.0, 0.0);
    }

    let recent = tail(prices, SUPPORT_RESISTANCE_LOOKBACK);
    let support = recent.iter().cloned().fold(f64::INFINITY, f64::min);
    let resistance = recent.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    (round_to(support, 2), round_to(resistance, 2))
}
