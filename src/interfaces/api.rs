//! Request facade over the analysis and forecasting services.
//!
//! Every route validates its query parameters, calls one service and maps
//! failures to an [`ApiError`] carrying an HTTP-style status code, so the
//! facade can sit behind any transport (the CLI binary, an HTTP router, ...).

use crate::application::analyzer::TechnicalAnalyzer;
use crate::application::ml::Forecaster;
use crate::domain::analysis::IndicatorSet;
use crate::domain::errors::AnalyticsError;
use crate::domain::forecast::{Forecast, MAX_HORIZON_DAYS, MIN_HORIZON_DAYS, TrainingReport};
use crate::domain::market::{
    CoinSummary, MarketSnapshot, PricePoint, TrendingCoin, normalize_asset_id,
};
use crate::domain::ports::MarketDataProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tracing::{info, warn};

pub const SERVICE_NAME: &str = "CryptoAnalytics";

pub const DEFAULT_PREDICT_DAYS: u32 = 7;
pub const DEFAULT_LIST_LIMIT: u32 = 50;
pub const DEFAULT_TRENDING_LIMIT: u32 = 10;
pub const DEFAULT_HISTORY_DAYS: u32 = 30;

const LIST_LIMIT_RANGE: RangeInclusive<u32> = 1..=100;
const TRENDING_LIMIT_RANGE: RangeInclusive<u32> = 1..=20;
const HISTORY_DAYS_RANGE: RangeInclusive<u32> = 1..=365;

/// Error body returned by every route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    pub status: u16,
    pub error: String,
    pub detail: String,
}

impl ApiError {
    fn new(status: u16, error: &str, detail: impl Into<String>) -> Self {
        Self {
            status,
            error: error.to_string(),
            detail: detail.into(),
        }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self::new(422, "validation_error", detail)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.status, self.error, self.detail)
    }
}

impl std::error::Error for ApiError {}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        let detail = err.to_string();
        match err {
            AnalyticsError::InvalidRequest { .. } => Self::new(400, "invalid_request", detail),
            AnalyticsError::InsufficientData { .. } => Self::new(400, "insufficient_data", detail),
            AnalyticsError::DataUnavailable { .. } => Self::new(502, "data_unavailable", detail),
            AnalyticsError::ModelUnavailable { .. } => Self::new(500, "model_unavailable", detail),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinListResponse<T> {
    pub total: usize,
    pub cryptos: Vec<T>,
}

impl<T> From<Vec<T>> for CoinListResponse<T> {
    fn from(cryptos: Vec<T>) -> Self {
        Self {
            total: cryptos.len(),
            cryptos,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalResponse {
    pub coin_id: String,
    pub period_days: u32,
    pub data_points: usize,
    pub prices: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Resolves an optional query parameter against its default and valid range.
fn bounded(
    name: &str,
    value: Option<u32>,
    default: u32,
    range: RangeInclusive<u32>,
) -> ApiResult<u32> {
    let value = value.unwrap_or(default);
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ApiError::validation(format!(
            "{} must be between {} and {}, got {}",
            name,
            range.start(),
            range.end(),
            value
        )))
    }
}

pub struct AnalyticsApi {
    provider: Arc<dyn MarketDataProvider>,
    analyzer: TechnicalAnalyzer,
    forecaster: Forecaster,
}

impl AnalyticsApi {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        analyzer: TechnicalAnalyzer,
        forecaster: Forecaster,
    ) -> Self {
        Self {
            provider,
            analyzer,
            forecaster,
        }
    }

    /// Current market data. Any upstream failure reads as an unknown coin.
    pub async fn crypto_info(&self, asset_id: &str) -> ApiResult<MarketSnapshot> {
        let asset_id = normalize_asset_id(asset_id)?;
        self.provider.fetch_current(&asset_id).await.map_err(|e| {
            warn!("AnalyticsApi: info for {} failed: {}", asset_id, e);
            ApiError::new(
                404,
                "not_found",
                format!("coin '{}' not found or unavailable: {}", asset_id, e),
            )
        })
    }

    pub async fn analysis(&self, asset_id: &str) -> ApiResult<IndicatorSet> {
        let asset_id = normalize_asset_id(asset_id)?;
        Ok(self.analyzer.analyze(&asset_id).await?)
    }

    pub async fn predict(&self, asset_id: &str, days: Option<u32>) -> ApiResult<Forecast> {
        let days = bounded(
            "days",
            days,
            DEFAULT_PREDICT_DAYS,
            MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS,
        )?;
        Ok(self.forecaster.predict(asset_id, days).await?)
    }

    /// Retrains the model for the pair regardless of what is stored.
    pub async fn train(&self, asset_id: &str, days: u32) -> ApiResult<TrainingReport> {
        let days = bounded(
            "days",
            Some(days),
            DEFAULT_PREDICT_DAYS,
            MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS,
        )?;
        info!("AnalyticsApi: explicit training request for {} ({}d)", asset_id, days);
        Ok(self.forecaster.train(asset_id, days).await?)
    }

    pub async fn list_cryptos(
        &self,
        limit: Option<u32>,
    ) -> ApiResult<CoinListResponse<CoinSummary>> {
        let limit = bounded("limit", limit, DEFAULT_LIST_LIMIT, LIST_LIMIT_RANGE)?;
        let coins = self.provider.top_coins(limit).await?;
        Ok(coins.into())
    }

    pub async fn trending(&self, limit: Option<u32>) -> ApiResult<CoinListResponse<TrendingCoin>> {
        let limit = bounded("limit", limit, DEFAULT_TRENDING_LIMIT, TRENDING_LIMIT_RANGE)?;
        let coins = self.provider.trending(limit).await?;
        Ok(coins.into())
    }

    pub async fn historical(
        &self,
        asset_id: &str,
        days: Option<u32>,
    ) -> ApiResult<HistoricalResponse> {
        let days = bounded("days", days, DEFAULT_HISTORY_DAYS, HISTORY_DAYS_RANGE)?;
        let asset_id = normalize_asset_id(asset_id)?;
        let prices = self.provider.fetch_history(&asset_id, days).await?;

        Ok(HistoricalResponse {
            coin_id: asset_id,
            period_days: days,
            data_points: prices.len(),
            prices,
        })
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
