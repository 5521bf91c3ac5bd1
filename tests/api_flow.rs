use crypto_analytics::application::analyzer::TechnicalAnalyzer;
use crypto_analytics::application::ml::{EnsembleParameters, ForecastSettings, Forecaster};
use crypto_analytics::domain::market::{MarketSnapshot, TrendingCoin};
use crypto_analytics::domain::ports::MarketDataProvider;
use crypto_analytics::infrastructure::InMemoryModelStore;
use crypto_analytics::infrastructure::mock::{MockMarketDataProvider, synthetic_series};
use crypto_analytics::interfaces::AnalyticsApi;
use std::sync::Arc;

fn build(provider: MockMarketDataProvider) -> AnalyticsApi {
    let provider: Arc<dyn MarketDataProvider> = Arc::new(provider);
    let settings = ForecastSettings {
        ensemble: EnsembleParameters::default().with_n_trees(8),
        ..ForecastSettings::default()
    };
    AnalyticsApi::new(
        provider.clone(),
        TechnicalAnalyzer::new(provider.clone(), 60),
        Forecaster::new(provider, Arc::new(InMemoryModelStore::new()), settings),
    )
}

fn snapshot() -> MarketSnapshot {
    MarketSnapshot {
        id: "bitcoin".to_string(),
        name: "Bitcoin".to_string(),
        symbol: "BTC".to_string(),
        current_price: 42000.0,
        market_cap: 8.2e11,
        total_volume: 2.1e10,
        price_change_24h: 1.5,
        high_24h: 42500.0,
        low_24h: 41000.0,
        last_updated: "2024-01-01T00:00:00Z".to_string(),
    }
}

#[tokio::test]
async fn test_predict_defaults_to_seven_days() {
    let prices: Vec<f64> = (0..90).map(|i| 200.0 + (i % 10) as f64).collect();
    let api =
        build(MockMarketDataProvider::new().with_history("ethereum", synthetic_series(&prices)));

    let forecast = api.predict("ethereum", None).await.unwrap();
    assert_eq!(forecast.horizon_days, 7);
    assert_eq!(forecast.asset_id, "ethereum");

    let body = serde_json::to_value(&forecast).unwrap();
    assert!(body.get("predicted_price").is_some());
    assert!(body.get("confidence").is_some());
}

#[tokio::test]
async fn test_insufficient_history_is_bad_request() {
    let prices: Vec<f64> = (0..40).map(|i| 10.0 + i as f64).collect();
    let api = build(MockMarketDataProvider::new().with_history("tiny", synthetic_series(&prices)));

    let err = api.predict("tiny", Some(3)).await.unwrap_err();
    assert_eq!(err.status, 400);
    assert_eq!(err.error, "insufficient_data");
    assert!(err.detail.contains("tiny"));

    let body = serde_json::to_value(&err).unwrap();
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_upstream_outage_maps_per_route() {
    let api = build(MockMarketDataProvider::unavailable());

    assert_eq!(api.crypto_info("bitcoin").await.unwrap_err().status, 404);
    assert_eq!(api.analysis("bitcoin").await.unwrap_err().status, 502);
    assert_eq!(api.predict("bitcoin", Some(7)).await.unwrap_err().status, 502);
    assert_eq!(api.list_cryptos(None).await.unwrap_err().status, 502);
}

#[tokio::test]
async fn test_info_returns_snapshot() {
    let api = build(MockMarketDataProvider::new().with_snapshot(snapshot()));
    let info = api.crypto_info("BITCOIN").await.unwrap();
    assert_eq!(info, snapshot());
}

#[tokio::test]
async fn test_trending_truncates_to_limit() {
    let coins: Vec<TrendingCoin> = (1..=5)
        .map(|rank| TrendingCoin {
            id: format!("hot-{}", rank),
            name: format!("Hot {}", rank),
            symbol: format!("H{}", rank),
            rank,
        })
        .collect();
    let api = build(MockMarketDataProvider::new().with_trending(coins));

    let trending = api.trending(Some(3)).await.unwrap();
    assert_eq!(trending.total, 3);
    assert_eq!(trending.cryptos[0].id, "hot-1");
}
