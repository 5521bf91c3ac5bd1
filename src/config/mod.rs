//! Configuration module for the analytics service.
//!
//! Structured configuration loading from environment variables, organized by
//! concern: market data provider and forecasting.

mod forecast_config;
mod provider_config;

pub use forecast_config::ForecastEnvConfig;
pub use provider_config::{DEFAULT_BASE_URL, ProviderEnvConfig};

use anyhow::{Context, Result};
use std::str::FromStr;

/// Main application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub provider: ProviderEnvConfig,
    pub forecast: ForecastEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `.env` loading is left to the binary.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider =
            ProviderEnvConfig::from_lookup(&lookup).context("Failed to load provider config")?;
        let forecast =
            ForecastEnvConfig::from_lookup(&lookup).context("Failed to load forecast config")?;

        Ok(Self { provider, forecast })
    }
}

/// Trimmed, non-empty value of `key`.
fn read_var<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match read_var(lookup, key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Failed to parse {}={:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_composes_sub_configs() {
        let config = Config::from_lookup(|key| match key {
            "VS_CURRENCY" => Some("eur".to_string()),
            "MODELS_DIR" => Some("/tmp/models".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.provider.vs_currency, "eur");
        assert_eq!(config.forecast.models_dir.to_string_lossy(), "/tmp/models");
    }

    #[test]
    fn test_config_error_names_section() {
        let err = Config::from_lookup(|key| {
            (key == "FORECAST_SEED").then(|| "-1".to_string())
        })
        .unwrap_err();
        let chain = format!("{:#}", err);
        assert!(chain.contains("forecast config"));
        assert!(chain.contains("FORECAST_SEED"));
    }
}
