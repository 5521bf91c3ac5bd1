use super::dataset::{WINDOW_SIZE, regression_errors, sliding_windows, train_test_split};
use super::ensemble::{BaggedTreeEnsemble, EnsembleParameters};
use crate::application::features::build_features;
use crate::application::indicators::round_to;
use crate::domain::errors::AnalyticsError;
use crate::domain::forecast::{Forecast, ForecastKey, ModelInfo, ModelState, TrainingReport};
use crate::domain::market;
use crate::domain::ports::{MarketDataProvider, ModelStore};
use statrs::statistics::Statistics;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Confidence reported when member predictions have a non-positive mean.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct ForecastSettings {
    pub ensemble: EnsembleParameters,
    /// Days of history requested for a training pass
    pub training_days: u32,
    /// Days of history requested for a forecast
    pub inference_days: u32,
    pub window_size: usize,
    pub min_training_points: usize,
    pub min_training_pairs: usize,
    pub min_inference_points: usize,
    pub test_fraction: f64,
    pub split_seed: u64,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            ensemble: EnsembleParameters::default(),
            training_days: 90,
            inference_days: 60,
            window_size: WINDOW_SIZE,
            min_training_points: 50,
            min_training_pairs: 10,
            min_inference_points: 30,
            test_fraction: 0.2,
            split_seed: 42,
        }
    }
}

/// Trains, persists and queries one ensemble per (asset, horizon).
///
/// Training and inference are separate operations; [`Forecaster::predict`]
/// composes them and trains on demand when no usable model is stored.
pub struct Forecaster {
    provider: Arc<dyn MarketDataProvider>,
    store: Arc<dyn ModelStore>,
    settings: ForecastSettings,
}

impl Forecaster {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        store: Arc<dyn ModelStore>,
        settings: ForecastSettings,
    ) -> Self {
        Self {
            provider,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &ForecastSettings {
        &self.settings
    }

    pub fn state(&self, key: &ForecastKey) -> Result<ModelState, AnalyticsError> {
        if self.store.contains(key)? {
            Ok(ModelState::Trained)
        } else {
            Ok(ModelState::Untrained)
        }
    }

    /// Fits a fresh model and overwrites whatever is stored for the key.
    pub async fn train(
        &self,
        asset_id: &str,
        horizon_days: u32,
    ) -> Result<TrainingReport, AnalyticsError> {
        let key = ForecastKey::new(asset_id, horizon_days)?;
        let (_, report) = self.fit_and_persist(&key).await?;
        Ok(report)
    }

    async fn fit_and_persist(
        &self,
        key: &ForecastKey,
    ) -> Result<(BaggedTreeEnsemble, TrainingReport), AnalyticsError> {
        let asset = key.asset_id();
        let history = self
            .provider
            .fetch_history(asset, self.settings.training_days)
            .await?;

        if history.len() < self.settings.min_training_points {
            return Err(AnalyticsError::insufficient_data(
                asset,
                format!(
                    "{} price points returned, at least {} needed to train",
                    history.len(),
                    self.settings.min_training_points
                ),
            ));
        }

        let prices = market::prices(&history);
        let volumes = market::volumes(&history);
        let dataset = sliding_windows(
            &prices,
            Some(&volumes),
            self.settings.window_size,
            key.horizon_days() as usize,
        );

        if dataset.len() < self.settings.min_training_pairs {
            return Err(AnalyticsError::insufficient_data(
                asset,
                format!(
                    "{} training windows for a {}-day horizon, at least {} needed",
                    dataset.len(),
                    key.horizon_days(),
                    self.settings.min_training_pairs
                ),
            ));
        }

        let (train, test) =
            train_test_split(&dataset, self.settings.test_fraction, self.settings.split_seed);

        info!(
            "Forecaster: training {} on {} samples ({} held out, {} trees, depth {})",
            key,
            train.len(),
            test.len(),
            self.settings.ensemble.n_trees,
            self.settings.ensemble.max_depth
        );

        let model = BaggedTreeEnsemble::fit(&train.features, &train.targets, self.settings.ensemble)
            .map_err(|e| AnalyticsError::model_unavailable(key, e))?;

        let predicted = model
            .predict(&test.features)
            .map_err(|e| AnalyticsError::model_unavailable(key, e))?;
        let errors = regression_errors(&predicted, &test.targets);

        let blob = model
            .to_json()
            .map_err(|e| AnalyticsError::model_unavailable(key, e))?;
        self.store.save(key, &blob)?;

        let report = TrainingReport {
            asset_id: asset.to_string(),
            horizon_days: key.horizon_days(),
            mae: round_to(errors.mae, 2),
            rmse: round_to(errors.rmse, 2),
            training_samples: train.len(),
            test_samples: test.len(),
            model_location: self.store.location(key),
        };

        info!(
            "Forecaster: {} trained (MAE={:.2}, RMSE={:.2}) -> {}",
            key, report.mae, report.rmse, report.model_location
        );

        Ok((model, report))
    }

    /// Reads the stored model. A blob that cannot be decoded is reported as
    /// `ModelUnavailable`.
    pub fn load(&self, key: &ForecastKey) -> Result<Option<BaggedTreeEnsemble>, AnalyticsError> {
        let Some(blob) = self.store.load(key)? else {
            return Ok(None);
        };

        BaggedTreeEnsemble::from_json(&blob)
            .map(Some)
            .map_err(|e| AnalyticsError::model_unavailable(key, format!("corrupt model: {}", e)))
    }

    /// Forecasts with an already loaded model.
    pub async fn forecast_with(
        &self,
        key: &ForecastKey,
        model: &BaggedTreeEnsemble,
    ) -> Result<Forecast, AnalyticsError> {
        let asset = key.asset_id();
        let history = self
            .provider
            .fetch_history(asset, self.settings.inference_days)
            .await?;

        if history.len() < self.settings.min_inference_points {
            return Err(AnalyticsError::insufficient_data(
                asset,
                format!(
                    "{} price points returned, at least {} needed to forecast",
                    history.len(),
                    self.settings.min_inference_points
                ),
            ));
        }

        let window = &history[history.len() - self.settings.window_size.min(history.len())..];
        let prices = market::prices(window);
        let volumes = market::volumes(window);
        let features = build_features(&prices, Some(&volumes));

        let members = model
            .member_predictions(features.values())
            .map_err(|e| AnalyticsError::model_unavailable(key, e))?;

        let member_mean = members.iter().mean();
        let confidence = if member_mean > 0.0 {
            (1.0 - members.iter().population_std_dev() / member_mean).clamp(0.0, 1.0)
        } else {
            NEUTRAL_CONFIDENCE
        };

        let predicted_price = member_mean;
        let current_price = prices[prices.len() - 1];
        let predicted_change_pct = if current_price != 0.0 {
            (predicted_price - current_price) / current_price * 100.0
        } else {
            0.0
        };

        debug!(
            "Forecaster: {} current={:.4} predicted={:.4} confidence={:.3}",
            key, current_price, predicted_price, confidence
        );

        Ok(Forecast {
            asset_id: asset.to_string(),
            current_price: round_to(current_price, 2),
            predicted_price: round_to(predicted_price, 2),
            predicted_change_pct: round_to(predicted_change_pct, 2),
            confidence: round_to(confidence, 3),
            horizon_days: key.horizon_days(),
            as_of: window[window.len() - 1].timestamp,
            model: ModelInfo {
                kind: BaggedTreeEnsemble::KIND.to_string(),
                estimators: model.n_trees(),
                max_depth: model.params().max_depth,
            },
        })
    }

    /// Loads the model for the key, training it first when it is missing or
    /// unreadable, then forecasts.
    pub async fn predict(
        &self,
        asset_id: &str,
        horizon_days: u32,
    ) -> Result<Forecast, AnalyticsError> {
        let key = ForecastKey::new(asset_id, horizon_days)?;

        let model = match self.load(&key) {
            Ok(Some(model)) => model,
            Ok(None) => {
                info!("Forecaster: no stored model for {}, training now", key);
                self.fit_and_persist(&key).await?.0
            }
            Err(e) => {
                warn!("Forecaster: {}. Retraining.", e);
                self.fit_and_persist(&key).await?.0
            }
        };

        self.forecast_with(&key, &model).await
    }
}
