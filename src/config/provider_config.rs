//! Market data provider configuration parsing from environment variables.

use super::{parse_or, read_var};
use anyhow::Result;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEnvConfig {
    pub base_url: String,
    /// Demo-plan key, sent only when set
    pub api_key: Option<String>,
    pub vs_currency: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderEnvConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            vs_currency: "usd".to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("CryptoAnalytics/{}", env!("CARGO_PKG_VERSION"))
}

impl ProviderEnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            base_url: read_var(&lookup, "COINGECKO_BASE_URL").unwrap_or(defaults.base_url),
            api_key: read_var(&lookup, "COINGECKO_API_KEY"),
            vs_currency: read_var(&lookup, "VS_CURRENCY")
                .map(|c| c.to_lowercase())
                .unwrap_or(defaults.vs_currency),
            timeout_secs: parse_or(&lookup, "HTTP_TIMEOUT_SECS", defaults.timeout_secs)?,
            connect_timeout_secs: parse_or(
                &lookup,
                "HTTP_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            user_agent: read_var(&lookup, "HTTP_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_provider_config_defaults() {
        let config = ProviderEnvConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ProviderEnvConfig::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.api_key.is_none());
        assert!(config.user_agent.starts_with("CryptoAnalytics/"));
    }

    #[test]
    fn test_provider_config_overrides() {
        let config = ProviderEnvConfig::from_lookup(lookup_from(&[
            ("COINGECKO_API_KEY", "demo"),
            ("VS_CURRENCY", "EUR"),
            ("HTTP_TIMEOUT_SECS", "30"),
            ("COINGECKO_BASE_URL", "http://localhost:8080"),
        ]))
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("demo"));
        assert_eq!(config.vs_currency, "eur");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config =
            ProviderEnvConfig::from_lookup(lookup_from(&[("COINGECKO_API_KEY", "  ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let err = ProviderEnvConfig::from_lookup(lookup_from(&[("HTTP_TIMEOUT_SECS", "ten")]))
            .unwrap_err();
        assert!(err.to_string().contains("HTTP_TIMEOUT_SECS"));
    }
}
