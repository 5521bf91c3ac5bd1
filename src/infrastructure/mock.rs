use crate::domain::errors::AnalyticsError;
use crate::domain::market::{CoinSummary, MarketSnapshot, PricePoint, PriceSeries, TrendingCoin};
use crate::domain::ports::MarketDataProvider;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// 2024-01-01T00:00:00Z, first timestamp of [`synthetic_series`].
const SYNTHETIC_EPOCH_SECS: i64 = 1_704_067_200;

/// Daily series starting 2024-01-01 with volumes `1000 + 10 * i`.
pub fn synthetic_series(prices: &[f64]) -> PriceSeries {
    let start = DateTime::<Utc>::from_timestamp(SYNTHETIC_EPOCH_SECS, 0).unwrap_or_default();
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            PricePoint::new(
                start + Duration::days(i as i64),
                price,
                1000.0 + 10.0 * i as f64,
            )
        })
        .collect()
}

/// In-process provider serving canned data.
///
/// Unknown assets and the [`MockMarketDataProvider::unavailable`] flag both
/// answer with `DataUnavailable`, like an upstream outage would.
#[derive(Default)]
pub struct MockMarketDataProvider {
    histories: HashMap<String, PriceSeries>,
    snapshots: HashMap<String, MarketSnapshot>,
    top_coins: Vec<CoinSummary>,
    trending: Vec<TrendingCoin>,
    unavailable: bool,
    history_calls: AtomicUsize,
}

impl MockMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, asset_id: &str, series: PriceSeries) -> Self {
        self.histories.insert(asset_id.to_string(), series);
        self
    }

    pub fn with_snapshot(mut self, snapshot: MarketSnapshot) -> Self {
        self.snapshots.insert(snapshot.id.clone(), snapshot);
        self
    }

    pub fn with_top_coins(mut self, coins: Vec<CoinSummary>) -> Self {
        self.top_coins = coins;
        self
    }

    pub fn with_trending(mut self, coins: Vec<TrendingCoin>) -> Self {
        self.trending = coins;
        self
    }

    /// Every call fails as if the upstream were down.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Number of `fetch_history` calls served so far.
    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self, resource: &str) -> Result<(), AnalyticsError> {
        if self.unavailable {
            return Err(AnalyticsError::data_unavailable(
                resource,
                "mock provider is offline",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketDataProvider {
    async fn fetch_current(&self, asset_id: &str) -> Result<MarketSnapshot, AnalyticsError> {
        self.check_available(asset_id)?;
        self.snapshots
            .get(asset_id)
            .cloned()
            .ok_or_else(|| AnalyticsError::data_unavailable(asset_id, "HTTP 404 Not Found"))
    }

    async fn fetch_history(
        &self,
        asset_id: &str,
        days: u32,
    ) -> Result<PriceSeries, AnalyticsError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available(asset_id)?;

        let series = self
            .histories
            .get(asset_id)
            .cloned()
            .ok_or_else(|| AnalyticsError::data_unavailable(asset_id, "HTTP 404 Not Found"))?;
        debug!(
            "MockMarketDataProvider: {} history for {} days -> {} points",
            asset_id,
            days,
            series.len()
        );
        Ok(series)
    }

    async fn top_coins(&self, limit: u32) -> Result<Vec<CoinSummary>, AnalyticsError> {
        self.check_available("coins/markets")?;
        Ok(self.top_coins.iter().take(limit as usize).cloned().collect())
    }

    async fn trending(&self, limit: u32) -> Result<Vec<TrendingCoin>, AnalyticsError> {
        self.check_available("search/trending")?;
        Ok(self.trending.iter().take(limit as usize).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_series_is_daily() {
        let series = synthetic_series(&[1.0, 2.0, 3.0]);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].timestamp.timestamp(), SYNTHETIC_EPOCH_SECS);
        assert_eq!(series[2].timestamp - series[0].timestamp, Duration::days(2));
        assert_eq!(series[2].volume, 1020.0);
    }

    #[tokio::test]
    async fn test_unknown_asset_is_unavailable() {
        let provider =
            MockMarketDataProvider::new().with_history("bitcoin", synthetic_series(&[1.0]));
        assert!(provider.fetch_history("bitcoin", 30).await.is_ok());
        let err = provider.fetch_history("dogecoin", 30).await.unwrap_err();
        assert!(matches!(err, AnalyticsError::DataUnavailable { .. }));
        assert_eq!(provider.history_calls(), 2);
    }

    #[tokio::test]
    async fn test_offline_provider() {
        let provider = MockMarketDataProvider::unavailable();
        assert!(provider.top_coins(5).await.is_err());
        assert!(provider.trending(5).await.is_err());
        assert!(provider.fetch_current("bitcoin").await.is_err());
    }
}
