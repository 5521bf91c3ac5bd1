use super::errors::AnalyticsError;
use super::market::normalize_asset_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_HORIZON_DAYS: u32 = 1;
pub const MAX_HORIZON_DAYS: u32 = 30;

/// Identifies one trained model: an asset and a forecast horizon in days.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForecastKey {
    asset_id: String,
    horizon_days: u32,
}

impl ForecastKey {
    /// Validates and normalises the pair. See [`normalize_asset_id`] for the
    /// accepted asset ids; the key doubles as a storage name.
    pub fn new(asset_id: &str, horizon_days: u32) -> Result<Self, AnalyticsError> {
        let asset_id = normalize_asset_id(asset_id)?;
        if !(MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS).contains(&horizon_days) {
            return Err(AnalyticsError::invalid_request(format!(
                "horizon must be between {} and {} days, got {}",
                MIN_HORIZON_DAYS, MAX_HORIZON_DAYS, horizon_days
            )));
        }
        Ok(Self {
            asset_id,
            horizon_days,
        })
    }

    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    /// Deterministic storage name, e.g. `bitcoin_7d`.
    pub fn storage_name(&self) -> String {
        format!("{}_{}d", self.asset_id, self.horizon_days)
    }
}

impl fmt::Display for ForecastKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelState {
    Untrained,
    Trained,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub kind: String,
    pub estimators: usize,
    pub max_depth: u16,
}

/// Point forecast for one asset and horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub asset_id: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub predicted_change_pct: f64,
    pub confidence: f64,
    pub horizon_days: u32,
    pub as_of: DateTime<Utc>,
    pub model: ModelInfo,
}

/// Outcome of a training pass, evaluated on the held-out split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub asset_id: String,
    pub horizon_days: u32,
    pub mae: f64,
    pub rmse: f64,
    pub training_samples: usize,
    pub test_samples: usize,
    pub model_location: String,
}
