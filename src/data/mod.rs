pub mod assets;
pub mod cache;
pub mod coingecko;
pub mod types;
