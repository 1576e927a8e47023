use serde::{Deserialize, Serialize};

use crate::data::assets;

/// The slice of asset metadata the price layer cares about: a ticker symbol
/// and, when the registry knows it, an explicit CoinGecko id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub symbol: String,
    #[serde(default)]
    pub coingecko_id: Option<String>,
}

impl AssetMetadata {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            coingecko_id: None,
        }
    }

    pub fn with_coingecko_id(symbol: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            coingecko_id: Some(id.into()),
        }
    }

    /// Derive the CoinGecko lookup key for this asset.
    ///
    /// An explicit id wins; otherwise well-known symbols map through the
    /// built-in table, and anything else falls back to the raw symbol. Assets
    /// with neither an id nor a symbol are not priceable.
    pub fn price_key(&self) -> Option<String> {
        if let Some(id) = &self.coingecko_id {
            if !id.is_empty() {
                return Some(id.clone());
            }
        }

        if self.symbol.is_empty() {
            return None;
        }

        match assets::coingecko_id_for_symbol(&self.symbol) {
            Some(id) => Some(id.to_string()),
            None => Some(self.symbol.clone()),
        }
    }
}
