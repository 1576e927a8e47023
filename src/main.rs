use std::time::Duration;

use anyhow::Result;
use coingecko_cache::data::assets;
use coingecko_cache::{AssetMetadata, CoinGeckoClient, Config, EnvConfig, PriceCache};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Loading configuration...");
    let config = Config::load("config.toml")?;
    let env_config = EnvConfig::load()?;

    tracing::info!(
        "Price cache: ttl={}s, refresh every {}s, currency={}",
        config.cache.ttl_secs,
        config.cache.refresh_interval_secs,
        config.provider.vs_currency
    );

    let client = CoinGeckoClient::new(
        config.provider.base_url.clone(),
        env_config.coingecko_api_key,
        config.provider.vs_currency.clone(),
    );
    let cache = PriceCache::new(
        client,
        Duration::from_secs(config.cache.ttl_secs),
        Duration::from_secs(config.cache.refresh_interval_secs),
    );

    cache.start_refresh_task();

    // Warm the cache for the built-in assets so the first dashboard load
    // doesn't pay provider latency.
    for symbol in assets::known_symbols() {
        let asset = AssetMetadata::new(*symbol);
        match cache.get_price(&asset).await {
            Some(price) => tracing::info!("{}: {} {}", symbol, price, config.provider.vs_currency),
            None => tracing::info!("{}: no price available", symbol),
        }
    }

    tracing::info!("Cache warmed with {} assets", cache.len());

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    Ok(())
}
