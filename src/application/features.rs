use crate::application::stats::{mean, tail};
use statrs::statistics::Statistics;

pub const FEATURE_COUNT: usize = 10;

/// Ordered list of feature names.
/// Any change here is a breaking change for persisted models.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "current_price",
    "pct_change_1",
    "pct_change_3",
    "pct_change_7",
    "sma_5",
    "sma_10",
    "sma_20",
    "volatility",
    "volume_avg",
    "volume_ratio",
];

/// Below this many prices the builder returns an all-zero vector.
pub const MIN_FEATURE_POINTS: usize = 20;

const VOLATILITY_WINDOW: usize = 10;
const VOLUME_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn zeros() -> Self {
        Self([0.0; FEATURE_COUNT])
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }
}

/// Percent change between the last price and the one `steps` before it.
fn pct_change(prices: &[f64], steps: usize) -> f64 {
    if prices.len() <= steps {
        return 0.0;
    }
    let current = prices[prices.len() - 1];
    let base = prices[prices.len() - 1 - steps];
    if base == 0.0 {
        return 0.0;
    }
    (current - base) / base * 100.0
}

/// Builds the forecaster's input vector from a trailing window.
///
/// Windows with fewer than [`MIN_FEATURE_POINTS`] prices produce
/// [`FeatureVector::zeros`]. `volumes`, when present, is expected to be
/// aligned with `prices`.
pub fn build_features(prices: &[f64], volumes: Option<&[f64]>) -> FeatureVector {
    if prices.len() < MIN_FEATURE_POINTS {
        return FeatureVector::zeros();
    }

    let current_price = prices[prices.len() - 1];

    let recent = tail(prices, VOLATILITY_WINDOW);
    let recent_mean = mean(recent);
    let volatility = if prices.len() >= VOLATILITY_WINDOW && recent_mean != 0.0 {
        recent.iter().population_std_dev() / recent_mean
    } else {
        0.0
    };

    let volume_avg = match volumes {
        Some(v) if v.len() >= VOLUME_WINDOW => mean(tail(v, VOLUME_WINDOW)),
        _ => 0.0,
    };
    let volume_ratio = match volumes.and_then(|v| v.last()) {
        Some(last) if volume_avg > 0.0 => last / volume_avg,
        _ => 1.0,
    };

    FeatureVector([
        current_price,
        pct_change(prices, 1),
        pct_change(prices, 3),
        pct_change(prices, 7),
        mean(tail(prices, 5)),
        mean(tail(prices, 10)),
        mean(tail(prices, 20)),
        volatility,
        volume_avg,
        volume_ratio,
    ])
}
