use crate::application::indicators::{
    MACD_FAST_PERIOD, MACD_SLOW_PERIOD, RSI_PERIOD, ema, macd, round_to, rsi, sma,
    support_resistance,
};
use crate::application::signals;
use crate::domain::analysis::IndicatorSet;
use crate::domain::errors::AnalyticsError;
use crate::domain::market::{self, PricePoint};
use crate::domain::ports::MarketDataProvider;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_ANALYSIS_DAYS: u32 = 60;

/// Fetches history and turns it into an [`IndicatorSet`].
pub struct TechnicalAnalyzer {
    provider: Arc<dyn MarketDataProvider>,
    history_days: u32,
}

impl TechnicalAnalyzer {
    pub fn new(provider: Arc<dyn MarketDataProvider>, history_days: u32) -> Self {
        Self {
            provider,
            history_days,
        }
    }

    pub async fn analyze(&self, asset_id: &str) -> Result<IndicatorSet, AnalyticsError> {
        let history = self
            .provider
            .fetch_history(asset_id, self.history_days)
            .await?;
        let analysis = analyze_series(asset_id, &history)?;

        info!(
            "TechnicalAnalyzer: {} trend={} signal={} rsi={:.2} macd={:.2}",
            asset_id, analysis.trend, analysis.signal, analysis.rsi, analysis.macd
        );

        Ok(analysis)
    }
}

/// Computes the indicator snapshot at the last point of `series`.
pub fn analyze_series(
    asset_id: &str,
    series: &[PricePoint],
) -> Result<IndicatorSet, AnalyticsError> {
    let Some(last) = series.last() else {
        return Err(AnalyticsError::insufficient_data(
            asset_id,
            "no price history returned",
        ));
    };

    let prices = market::prices(series);
    let current_price = last.price;

    let sma_20 = sma(&prices, 20);
    let sma_50 = sma(&prices, 50);
    let ema_12 = ema(&prices, 12);
    let ema_26 = ema(&prices, 26);
    let rsi = rsi(&prices, RSI_PERIOD);
    let macd = macd(&prices, MACD_FAST_PERIOD, MACD_SLOW_PERIOD);
    let (support, resistance) = support_resistance(&prices);

    let trend = signals::trend(&prices, sma_20, sma_50);
    let signal = signals::signal(rsi, macd, trend, current_price, sma_20);

    Ok(IndicatorSet {
        asset_id: asset_id.to_string(),
        as_of: last.timestamp,
        current_price: round_to(current_price, 2),
        sma_20: round_to(sma_20, 2),
        sma_50: round_to(sma_50, 2),
        ema_12: round_to(ema_12, 2),
        ema_26: round_to(ema_26, 2),
        rsi: round_to(rsi, 2),
        macd: round_to(macd, 2),
        support,
        resistance,
        trend,
        signal,
    })
}
