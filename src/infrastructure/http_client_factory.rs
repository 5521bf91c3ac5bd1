use crate::config::ProviderEnvConfig;
use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::time::Duration;

/// Header CoinGecko reads the demo-plan API key from.
pub const API_KEY_HEADER: &str = "x-cg-demo-api-key";

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates the shared HTTP client for the data provider.
    ///
    /// No retry layer: a failed request fails the caller's operation.
    pub fn create_client(config: &ProviderEnvConfig) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key)
                .context("COINGECKO_API_KEY is not a valid header value")?;
            headers.insert(API_KEY_HEADER, value);
        }

        Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .pool_max_idle_per_host(5)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }
}
