use crate::domain::errors::AnalyticsError;
use crate::domain::forecast::ForecastKey;
use crate::domain::market::{CoinSummary, MarketSnapshot, PriceSeries, TrendingCoin};
use async_trait::async_trait;

/// Source of market data. Every failure is reported as
/// [`AnalyticsError::DataUnavailable`].
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_current(&self, asset_id: &str) -> Result<MarketSnapshot, AnalyticsError>;

    /// Price/volume history covering the last `days`, oldest first.
    async fn fetch_history(&self, asset_id: &str, days: u32)
    -> Result<PriceSeries, AnalyticsError>;

    async fn top_coins(&self, limit: u32) -> Result<Vec<CoinSummary>, AnalyticsError>;

    async fn trending(&self, limit: u32) -> Result<Vec<TrendingCoin>, AnalyticsError>;
}

/// Key-value storage for serialized models.
///
/// Writes replace the previous blob wholesale. There is no locking between
/// writers of the same key.
pub trait ModelStore: Send + Sync {
    fn contains(&self, key: &ForecastKey) -> Result<bool, AnalyticsError>;

    fn load(&self, key: &ForecastKey) -> Result<Option<Vec<u8>>, AnalyticsError>;

    fn save(&self, key: &ForecastKey, blob: &[u8]) -> Result<(), AnalyticsError>;

    /// Human readable location of the blob (path, memory slot, ...).
    fn location(&self, key: &ForecastKey) -> String;
}
