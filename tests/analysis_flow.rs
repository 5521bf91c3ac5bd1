use crypto_analytics::application::analyzer::TechnicalAnalyzer;
use crypto_analytics::domain::analysis::{TradeSignal, Trend};
use crypto_analytics::domain::errors::AnalyticsError;
use crypto_analytics::infrastructure::mock::{MockMarketDataProvider, synthetic_series};
use std::sync::Arc;

fn analyzer_for(asset: &str, prices: &[f64]) -> TechnicalAnalyzer {
    let provider =
        Arc::new(MockMarketDataProvider::new().with_history(asset, synthetic_series(prices)));
    TechnicalAnalyzer::new(provider, 60)
}

#[tokio::test]
async fn test_rising_series_buys() {
    // Gentle rise with dips so RSI stays under 70
    let prices: Vec<f64> = (0..60)
        .map(|i| 100.0 + i as f64 * 0.5 + if i % 2 == 0 { 0.0 } else { -2.0 })
        .collect();
    let analysis = analyzer_for("bitcoin", &prices).analyze("bitcoin").await.unwrap();

    assert_eq!(analysis.trend, Trend::Up);
    assert!(analysis.rsi < 70.0, "rsi {}", analysis.rsi);
    assert!(analysis.macd > 0.0);
    assert_eq!(analysis.signal, TradeSignal::Buy);
    assert_eq!(analysis.asset_id, "bitcoin");
    assert!(analysis.support <= analysis.current_price);
    assert!(analysis.resistance >= analysis.current_price);
}

#[tokio::test]
async fn test_empty_history_is_insufficient() {
    let err = analyzer_for("ghost", &[]).analyze("ghost").await.unwrap_err();
    assert!(matches!(err, AnalyticsError::InsufficientData { .. }));
    assert!(err.to_string().contains("ghost"));
}

#[tokio::test]
async fn test_unknown_asset_is_data_unavailable() {
    let err = analyzer_for("bitcoin", &[1.0, 2.0])
        .analyze("dogecoin")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::DataUnavailable { .. }));
}
