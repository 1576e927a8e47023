pub mod config;
pub mod data;

pub use config::{Config, EnvConfig};
pub use data::cache::PriceCache;
pub use data::coingecko::{CoinGeckoClient, PriceFetchError, PriceSource};
pub use data::types::AssetMetadata;
