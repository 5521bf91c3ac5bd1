//! CoinGecko Market Data Client
//!
//! Implements [`MarketDataProvider`] on top of the public CoinGecko v3 REST API:
//! - Coin snapshot (`coins/{id}`)
//! - Price/volume history (`coins/{id}/market_chart`)
//! - Market-cap ranking (`coins/markets`)
//! - Trending search (`search/trending`)
//!
//! Requests are neither cached nor retried.

use super::http_client_factory::HttpClientFactory;
use crate::config::ProviderEnvConfig;
use crate::domain::errors::AnalyticsError;
use crate::domain::market::{CoinSummary, MarketSnapshot, PricePoint, PriceSeries, TrendingCoin};
use crate::domain::ports::MarketDataProvider;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Above this many days the chart is requested at daily granularity.
const DAILY_INTERVAL_THRESHOLD_DAYS: u32 = 30;

pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    vs_currency: String,
}

impl CoinGeckoClient {
    pub fn new(config: &ProviderEnvConfig) -> anyhow::Result<Self> {
        let client = HttpClientFactory::create_client(config)?;
        info!("CoinGeckoClient: using {}", config.base_url);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            vs_currency: config.vs_currency.to_lowercase(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, AnalyticsError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("CoinGeckoClient: GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| AnalyticsError::data_unavailable(resource, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("CoinGeckoClient: {} returned {}", endpoint, status);
            return Err(AnalyticsError::data_unavailable(
                resource,
                format!("HTTP {} from {}: {}", status, endpoint, truncate(&body, 200)),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            AnalyticsError::data_unavailable(resource, format!("malformed payload: {}", e))
        })
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

type CurrencyMap = HashMap<String, Option<f64>>;

fn in_currency(map: &CurrencyMap, currency: &str) -> f64 {
    map.get(currency).copied().flatten().unwrap_or(0.0)
}

#[derive(Debug, Deserialize)]
struct CoinDetail {
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    market_data: CoinMarketData,
}

#[derive(Debug, Default, Deserialize)]
struct CoinMarketData {
    #[serde(default)]
    current_price: CurrencyMap,
    #[serde(default)]
    market_cap: CurrencyMap,
    #[serde(default)]
    total_volume: CurrencyMap,
    #[serde(default)]
    high_24h: CurrencyMap,
    #[serde(default)]
    low_24h: CurrencyMap,
    price_change_percentage_24h: Option<f64>,
    last_updated: Option<String>,
}

fn snapshot_from_detail(asset_id: &str, detail: CoinDetail, currency: &str) -> MarketSnapshot {
    let data = &detail.market_data;
    MarketSnapshot {
        id: detail.id.clone().unwrap_or_else(|| asset_id.to_string()),
        name: detail.name.clone(),
        symbol: detail.symbol.to_uppercase(),
        current_price: in_currency(&data.current_price, currency),
        market_cap: in_currency(&data.market_cap, currency),
        total_volume: in_currency(&data.total_volume, currency),
        price_change_24h: data.price_change_percentage_24h.unwrap_or(0.0),
        high_24h: in_currency(&data.high_24h, currency),
        low_24h: in_currency(&data.low_24h, currency),
        last_updated: data
            .last_updated
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339()),
    }
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<(f64, Option<f64>)>,
    #[serde(default)]
    total_volumes: Vec<(f64, Option<f64>)>,
}

/// Zips the price and volume arrays by position.
///
/// Entries without a usable timestamp or price are dropped; a missing volume
/// counts as zero.
fn series_from_chart(asset_id: &str, chart: MarketChart) -> PriceSeries {
    let mut series = Vec::with_capacity(chart.prices.len());

    for (idx, (ts_ms, price)) in chart.prices.iter().enumerate() {
        let Some(timestamp) = DateTime::<Utc>::from_timestamp_millis(*ts_ms as i64) else {
            debug!("CoinGeckoClient: {} skipping invalid timestamp {}", asset_id, ts_ms);
            continue;
        };
        let Some(price) = price.filter(|p| p.is_finite() && *p > 0.0) else {
            debug!("CoinGeckoClient: {} skipping empty price at {}", asset_id, timestamp);
            continue;
        };
        let volume = chart
            .total_volumes
            .get(idx)
            .and_then(|(_, v)| *v)
            .unwrap_or(0.0);

        series.push(PricePoint::new(timestamp, price, volume));
    }

    series
}

#[derive(Debug, Deserialize)]
struct MarketEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
    current_price: Option<f64>,
    market_cap: Option<f64>,
}

impl From<MarketEntry> for CoinSummary {
    fn from(entry: MarketEntry) -> Self {
        CoinSummary {
            id: entry.id,
            name: entry.name,
            symbol: entry.symbol.to_uppercase(),
            current_price: entry.current_price.unwrap_or(0.0),
            market_cap: entry.market_cap.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    coins: Vec<TrendingEntry>,
}

#[derive(Debug, Deserialize)]
struct TrendingEntry {
    item: TrendingItem,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    symbol: String,
    market_cap_rank: Option<u32>,
}

impl From<TrendingItem> for TrendingCoin {
    fn from(item: TrendingItem) -> Self {
        TrendingCoin {
            id: item.id,
            name: item.name,
            symbol: item.symbol.to_uppercase(),
            rank: item.market_cap_rank.unwrap_or(0),
        }
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn fetch_current(&self, asset_id: &str) -> Result<MarketSnapshot, AnalyticsError> {
        let params = [
            ("localization", "false".to_string()),
            ("tickers", "false".to_string()),
            ("market_data", "true".to_string()),
            ("community_data", "false".to_string()),
            ("developer_data", "false".to_string()),
            ("sparkline", "false".to_string()),
        ];
        let detail: CoinDetail = self
            .get_json(asset_id, &format!("coins/{}", asset_id), &params)
            .await?;

        Ok(snapshot_from_detail(asset_id, detail, &self.vs_currency))
    }

    async fn fetch_history(
        &self,
        asset_id: &str,
        days: u32,
    ) -> Result<PriceSeries, AnalyticsError> {
        let mut params = vec![
            ("vs_currency", self.vs_currency.clone()),
            ("days", days.to_string()),
        ];
        if days > DAILY_INTERVAL_THRESHOLD_DAYS {
            params.push(("interval", "daily".to_string()));
        }

        let chart: MarketChart = self
            .get_json(asset_id, &format!("coins/{}/market_chart", asset_id), &params)
            .await?;
        let series = series_from_chart(asset_id, chart);

        debug!(
            "CoinGeckoClient: {} history over {} days -> {} points",
            asset_id,
            days,
            series.len()
        );
        Ok(series)
    }

    async fn top_coins(&self, limit: u32) -> Result<Vec<CoinSummary>, AnalyticsError> {
        let params = [
            ("vs_currency", self.vs_currency.clone()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", limit.to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
        ];
        let entries: Vec<MarketEntry> = self
            .get_json("coins/markets", "coins/markets", &params)
            .await?;

        Ok(entries.into_iter().map(CoinSummary::from).collect())
    }

    async fn trending(&self, limit: u32) -> Result<Vec<TrendingCoin>, AnalyticsError> {
        let response: TrendingResponse = self
            .get_json("search/trending", "search/trending", &[])
            .await?;

        Ok(response
            .coins
            .into_iter()
            .take(limit as usize)
            .map(|entry| TrendingCoin::from(entry.item))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_zips_prices_and_volumes() {
        let chart: MarketChart = serde_json::from_str(
            r#"{
                "prices": [[1704067200000, 42000.5], [1704153600000, 43000.0], [1704240000000, null]],
                "total_volumes": [[1704067200000, 1.5e10]]
            }"#,
        )
        .unwrap();

        let series = series_from_chart("bitcoin", chart);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].price, 42000.5);
        assert_eq!(series[0].volume, 1.5e10);
        assert_eq!(series[0].timestamp.timestamp(), 1_704_067_200);
        // Volume array is shorter than the price array
        assert_eq!(series[1].volume, 0.0);
    }

    #[test]
    fn test_snapshot_mapping() {
        let detail: CoinDetail = serde_json::from_str(
            r#"{
                "id": "ethereum",
                "name": "Ethereum",
                "symbol": "eth",
                "market_data": {
                    "current_price": {"usd": 2300.12, "eur": 2100.0},
                    "market_cap": {"usd": 2.7e11},
                    "total_volume": {"usd": 1.1e10},
                    "high_24h": {"usd": 2350.0},
                    "low_24h": {"usd": null},
                    "price_change_percentage_24h": -1.25,
                    "last_updated": "2024-01-01T00:00:00.000Z"
                }
            }"#,
        )
        .unwrap();

        let snapshot = snapshot_from_detail("ethereum", detail, "usd");
        assert_eq!(snapshot.symbol, "ETH");
        assert_eq!(snapshot.current_price, 2300.12);
        assert_eq!(snapshot.low_24h, 0.0);
        assert_eq!(snapshot.price_change_24h, -1.25);
        assert_eq!(snapshot.last_updated, "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_snapshot_defaults_for_sparse_payload() {
        let detail: CoinDetail = serde_json::from_str(r#"{"name": "Mystery"}"#).unwrap();
        let snapshot = snapshot_from_detail("mystery", detail, "usd");
        assert_eq!(snapshot.id, "mystery");
        assert_eq!(snapshot.market_cap, 0.0);
        assert!(!snapshot.last_updated.is_empty());
    }

    #[test]
    fn test_trending_and_markets_mapping() {
        let trending: TrendingResponse = serde_json::from_str(
            r#"{"coins": [{"item": {"id": "pepe", "name": "Pepe", "symbol": "pepe", "market_cap_rank": 30}},
                          {"item": {"id": "new", "name": "New", "symbol": "new"}}]}"#,
        )
        .unwrap();
        let coins: Vec<TrendingCoin> = trending
            .coins
            .into_iter()
            .map(|e| TrendingCoin::from(e.item))
            .collect();
        assert_eq!(coins[0].symbol, "PEPE");
        assert_eq!(coins[0].rank, 30);
        assert_eq!(coins[1].rank, 0);

        let entries: Vec<MarketEntry> = serde_json::from_str(
            r#"[{"id": "bitcoin", "name": "Bitcoin", "symbol": "btc", "current_price": 42000.0, "market_cap": null}]"#,
        )
        .unwrap();
        let summary = CoinSummary::from(entries.into_iter().next().unwrap());
        assert_eq!(summary.symbol, "BTC");
        assert_eq!(summary.market_cap, 0.0);
    }

    #[test]
    fn test_truncate_error_body() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
    }
}
