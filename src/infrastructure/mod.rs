pub mod coingecko;
pub mod http_client_factory;
pub mod mock;
pub mod model_store;

pub use coingecko::CoinGeckoClient;
pub use http_client_factory::HttpClientFactory;
pub use model_store::{FileModelStore, InMemoryModelStore};
