//! Forecasting and analysis configuration parsing from environment variables.

use super::{parse_or, read_var};
use crate::application::analyzer::DEFAULT_ANALYSIS_DAYS;
use crate::application::ml::{EnsembleParameters, ForecastSettings};
use anyhow::{Result, bail};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEnvConfig {
    pub models_dir: PathBuf,
    pub n_trees: usize,
    pub max_depth: u16,
    pub seed: u64,
    pub analysis_history_days: u32,
}

impl Default for ForecastEnvConfig {
    fn default() -> Self {
        let ensemble = EnsembleParameters::default();
        Self {
            models_dir: PathBuf::from("models"),
            n_trees: ensemble.n_trees,
            max_depth: ensemble.max_depth,
            seed: ensemble.seed,
            analysis_history_days: DEFAULT_ANALYSIS_DAYS,
        }
    }
}

impl ForecastEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            models_dir: read_var(&lookup, "MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.models_dir),
            n_trees: parse_or(&lookup, "FORECAST_N_TREES", defaults.n_trees)?,
            max_depth: parse_or(&lookup, "FORECAST_MAX_DEPTH", defaults.max_depth)?,
            seed: parse_or(&lookup, "FORECAST_SEED", defaults.seed)?,
            analysis_history_days: parse_or(
                &lookup,
                "ANALYSIS_HISTORY_DAYS",
                defaults.analysis_history_days,
            )?,
        };

        if config.n_trees == 0 {
            bail!("FORECAST_N_TREES must be at least 1");
        }
        if config.max_depth == 0 {
            bail!("FORECAST_MAX_DEPTH must be at least 1");
        }
        if config.analysis_history_days == 0 {
            bail!("ANALYSIS_HISTORY_DAYS must be at least 1");
        }

        Ok(config)
    }

    /// Forecaster settings with the configured ensemble shape.
    pub fn to_settings(&self) -> ForecastSettings {
        let ensemble = EnsembleParameters::default()
            .with_n_trees(self.n_trees)
            .with_max_depth(self.max_depth)
            .with_seed(self.seed);

        ForecastSettings {
            ensemble,
            ..ForecastSettings::default()
        }
    }
}
