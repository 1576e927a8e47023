use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PriceFetchError {
    #[error("provider returned status {0}")]
    Status(StatusCode),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed price response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Source of truth for asset prices. The cache is generic over this so tests
/// can substitute a scripted source.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current price for one CoinGecko id.
    ///
    /// `Ok(None)` means the provider answered but has no price for this id,
    /// which is a valid outcome, not an error.
    async fn fetch_price(&self, id: &str) -> Result<Option<f64>, PriceFetchError>;
}

pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: String,
    vs_currency: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: String, api_key: String, vs_currency: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            vs_currency,
        }
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_price(&self, id: &str) -> Result<Option<f64>, PriceFetchError> {
        let url = format!("{}/simple/price", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("ids", id),
                ("vs_currencies", self.vs_currency.as_str()),
                ("x_cg_pro_api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceFetchError::Status(status));
        }

        // Body shape: { "<id>": { "<currency>": <price> } }. A missing id
        // means CoinGecko has no data for it.
        let body = response.text().await?;
        let prices: HashMap<String, HashMap<String, f64>> = serde_json::from_str(&body)?;

        Ok(prices
            .get(id)
            .and_then(|quotes| quotes.get(&self.vs_currency))
            .copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> CoinGeckoClient {
        CoinGeckoClient::new(server.url(), "test-key".to_string(), "usd".to_string())
    }

    #[tokio::test]
    async fn test_fetches_price_from_simple_price_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/simple/price")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ids".into(), "bitcoin".into()),
                Matcher::UrlEncoded("vs_currencies".into(), "usd".into()),
                Matcher::UrlEncoded("x_cg_pro_api_key".into(), "test-key".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"bitcoin":{"usd":42000.0}}"#)
            .create_async()
            .await;

        let price = client_for(&server).fetch_price("bitcoin").await.unwrap();

        assert_eq!(price, Some(42000.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_id_in_body_is_no_data_not_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let price = client_for(&server).fetch_price("unlisted-coin").await.unwrap();

        assert_eq!(price, None);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server).fetch_price("bitcoin").await.unwrap_err();

        match err {
            PriceFetchError::Status(status) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR)
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server).fetch_price("bitcoin").await.unwrap_err();

        assert!(matches!(err, PriceFetchError::Malformed(_)));
    }
}
