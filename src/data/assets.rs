/// Map well-known ticker symbols to their canonical CoinGecko ids.
///
/// CoinGecko keys its price endpoint by coin id, not symbol, so assets whose
/// metadata carries no explicit id go through this table before we fall back
/// to the raw symbol.
pub fn coingecko_id_for_symbol(symbol: &str) -> Option<&'static str> {
    match symbol.to_ascii_uppercase().as_str() {
        "ATOM" => Some("cosmos"),
        "BTC" => Some("bitcoin"),
        "ETH" => Some("ethereum"),
        "TIA" => Some("celestia"),
        "OSMO" => Some("osmosis"),
        "USDC" => Some("usd-coin"),
        "WBTC" => Some("wrapped-bitcoin"),
        // Add more asset mappings here
        _ => None,
    }
}

/// Symbols covered by the built-in table, used to warm the cache at startup.
pub fn known_symbols() -> &'static [&'static str] {
    &["ATOM", "BTC", "ETH", "TIA", "OSMO", "USDC", "WBTC"]
}
