use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
}

// Ten-minute TTL, half-hour sweep.
fn default_ttl_secs() -> u64 {
    600
}

fn default_refresh_interval_secs() -> u64 {
    1800
}

fn default_base_url() -> String {
    "https://pro-api.coingecko.com/api/v3".to_string()
}

fn default_vs_currency() -> String {
    "usd".to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            vs_currency: default_vs_currency(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub coingecko_api_key: String,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            coingecko_api_key: std::env::var("COINGECKO_API_KEY")
                .context("COINGECKO_API_KEY not set")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.cache.refresh_interval_secs, 1800);
        assert_eq!(config.provider.vs_currency, "usd");
        assert!(config.provider.base_url.contains("coingecko.com"));
    }

    #[test]
    fn test_partial_config_overrides() {
        let config: Config = toml::from_str(
            r#"
            [cache]
            ttl_secs = 30

            [provider]
            vs_currency = "eur"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.ttl_secs, 30);
        assert_eq!(config.cache.refresh_interval_secs, 1800);
        assert_eq!(config.provider.vs_currency, "eur");
    }
}
