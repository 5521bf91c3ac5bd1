use super::errors::AnalyticsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of an asset's price history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volume: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64, volume: f64) -> Self {
        Self {
            timestamp,
            price,
            volume,
        }
    }
}

/// Chronologically ordered history for one asset, oldest first.
pub type PriceSeries = Vec<PricePoint>;

/// Price column of a series.
pub fn prices(series: &[PricePoint]) -> Vec<f64> {
    series.iter().map(|p| p.price).collect()
}

/// Volume column of a series, aligned with [`prices`].
pub fn volumes(series: &[PricePoint]) -> Vec<f64> {
    series.iter().map(|p| p.volume).collect()
}

/// Lowercases an asset id and restricts it to `[a-z0-9-_.]`, not starting
/// with a dot. Ids end up in URL paths and file names.
pub fn normalize_asset_id(asset_id: &str) -> Result<String, AnalyticsError> {
    let asset_id = asset_id.trim().to_lowercase();
    if asset_id.is_empty() {
        return Err(AnalyticsError::invalid_request("asset id must not be empty"));
    }
    if asset_id.starts_with('.')
        || !asset_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(AnalyticsError::invalid_request(format!(
            "asset id '{}' contains unsupported characters",
            asset_id
        )));
    }
    Ok(asset_id)
}

/// Current market state of a single coin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub current_price: f64,
    pub market_cap: f64,
    pub total_volume: f64,
    pub price_change_24h: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub last_updated: String,
}

/// Entry of the market-cap ranked coin list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSummary {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub current_price: f64,
    pub market_cap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub rank: u32,
}
