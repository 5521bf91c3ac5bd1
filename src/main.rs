//! CryptoAnalytics command line front-end.
//!
//! Runs one request against CoinGecko and prints the JSON response.
//!
//! # Usage
//! ```sh
//! crypto-analytics analyze bitcoin
//! crypto-analytics predict ethereum --days 14
//! RUST_LOG=crypto_analytics=debug crypto-analytics top --limit 10
//! ```
//!
//! # Environment Variables
//! - `COINGECKO_BASE_URL`, `COINGECKO_API_KEY`, `VS_CURRENCY`
//! - `HTTP_TIMEOUT_SECS`, `HTTP_CONNECT_TIMEOUT_SECS`, `HTTP_USER_AGENT`
//! - `MODELS_DIR`, `FORECAST_N_TREES`, `FORECAST_MAX_DEPTH`, `FORECAST_SEED`
//! - `ANALYSIS_HISTORY_DAYS`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crypto_analytics::application::analyzer::TechnicalAnalyzer;
use crypto_analytics::application::ml::Forecaster;
use crypto_analytics::config::Config;
use crypto_analytics::domain::ports::{MarketDataProvider, ModelStore};
use crypto_analytics::infrastructure::{CoinGeckoClient, FileModelStore};
use crypto_analytics::interfaces::api::{AnalyticsApi, ApiResult, DEFAULT_PREDICT_DAYS};
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Crypto market analytics and price forecasting",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Current market data for a coin
    Info {
        /// CoinGecko coin id (e.g. bitcoin)
        coin: String,
    },
    /// Technical indicators, trend and trade signal
    Analyze { coin: String },
    /// Price forecast (trains a model on first use)
    Predict {
        coin: String,

        /// Forecast horizon in days (1-30)
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Retrain the forecast model for a coin and horizon
    Train {
        coin: String,

        /// Forecast horizon in days (1-30)
        #[arg(short, long, default_value_t = DEFAULT_PREDICT_DAYS)]
        days: u32,
    },
    /// Price and volume history
    History {
        coin: String,

        /// Days of history (1-365)
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Coins ranked by market cap
    Top {
        /// Number of coins (1-100)
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Trending coins
    Trending {
        /// Number of coins (1-20)
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Service health
    Health,
}

fn build_api(config: &Config) -> Result<AnalyticsApi> {
    let provider: Arc<dyn MarketDataProvider> = Arc::new(
        CoinGeckoClient::new(&config.provider).context("Failed to create CoinGecko client")?,
    );
    let store: Arc<dyn ModelStore> = Arc::new(
        FileModelStore::new(&config.forecast.models_dir).context("Failed to open model store")?,
    );

    let analyzer = TechnicalAnalyzer::new(provider.clone(), config.forecast.analysis_history_days);
    let forecaster = Forecaster::new(provider.clone(), store, config.forecast.to_settings());

    Ok(AnalyticsApi::new(provider, analyzer, forecaster))
}

fn render<T: Serialize>(result: ApiResult<T>) -> Result<ExitCode> {
    match result {
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(api_error) => {
            error!("Request failed: {}", api_error);
            eprintln!("{}", serde_json::to_string_pretty(&api_error)?);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run(api: &AnalyticsApi, command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Info { coin } => render(api.crypto_info(&coin).await),
        Commands::Analyze { coin } => render(api.analysis(&coin).await),
        Commands::Predict { coin, days } => render(api.predict(&coin, days).await),
        Commands::Train { coin, days } => render(api.train(&coin, days).await),
        Commands::History { coin, days } => render(api.historical(&coin, days).await),
        Commands::Top { limit } => render(api.list_cryptos(limit).await),
        Commands::Trending { limit } => render(api.trending(limit).await),
        Commands::Health => render(Ok(api.health())),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays valid JSON
    let log_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(log_layer)
        .init();

    let cli = Cli::parse();

    let config = Config::from_env()?;
    info!(
        "CryptoAnalytics {} (provider={}, models={:?})",
        env!("CARGO_PKG_VERSION"),
        config.provider.base_url,
        config.forecast.models_dir
    );

    let api = build_api(&config)?;
    run(&api, cli.command).await
}
