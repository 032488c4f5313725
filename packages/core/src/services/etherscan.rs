//! Etherscan gas oracle client.
//!
//! The upstream gas oracle is the only external data source: a single
//! `gastracker/gasoracle` call returning the current safe gas price in
//! Gwei. Failures never reach the forecasting core: the request path
//! degrades to a fallback price and the sampler skips the tick.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;

use crate::error::AppError;

/// Base delay before the single retry of a failed oracle fetch.
const RETRY_BASE_DELAY_MS: u64 = 200;

/// Source of the current gas price, abstracted for tests and alternative
/// oracles.
#[async_trait]
pub trait GasPriceProvider {
    /// Fetch the current safe gas price in Gwei.
    async fn current_gas_price(&self) -> Result<f64, AppError>;
}

#[derive(Clone)]
pub struct EtherscanClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct OracleEnvelope {
    status: String,
    message: String,
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GasOracleResult {
    #[serde(rename = "SafeGasPrice")]
    pub safe_gas_price: String,
    #[serde(rename = "ProposeGasPrice")]
    pub propose_gas_price: Option<String>,
    #[serde(rename = "FastGasPrice")]
    pub fast_gas_price: Option<String>,
}

impl EtherscanClient {
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self {
            base_url,
            api_key,
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch and parse the gas oracle snapshot.
    pub async fn fetch_gas_oracle(&self) -> Result<GasOracleResult, AppError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            AppError::Config("ETHERSCAN_API_KEY not configured".to_string())
        })?;

        let url = format!(
            "{}?module=gastracker&action=gasoracle&apikey={}",
            self.base_url, api_key
        );

        let envelope = match self.request_oracle(&url).await {
            Ok(envelope) => envelope,
            Err(err) => {
                // One retry with jitter smooths over transient upstream
                // hiccups without hammering the rate-limited API.
                let jitter = rand::thread_rng().gen_range(0..RETRY_BASE_DELAY_MS);
                tracing::debug!("Retrying gas oracle fetch after error: {}", err);
                tokio::time::sleep(Duration::from_millis(RETRY_BASE_DELAY_MS + jitter)).await;
                self.request_oracle(&url).await?
            }
        };

        if envelope.status != "1" {
            return Err(AppError::Network(format!(
                "Etherscan API error: {}",
                envelope.message
            )));
        }

        serde_json::from_value(envelope.result)
            .map_err(|err| AppError::Parse(err.to_string()))
    }

    async fn request_oracle(&self, url: &str) -> Result<OracleEnvelope, AppError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Network(format!(
                "Etherscan returned HTTP {}",
                response.status()
            )));
        }

        response
            .json::<OracleEnvelope>()
            .await
            .map_err(|err| AppError::Parse(err.to_string()))
    }
}

#[async_trait]
impl GasPriceProvider for EtherscanClient {
    async fn current_gas_price(&self) -> Result<f64, AppError> {
        let oracle = self.fetch_gas_oracle().await?;
        let price = oracle
            .safe_gas_price
            .parse::<f64>()
            .map_err(|err| AppError::Parse(format!("SafeGasPrice: {}", err)))?;
        tracing::info!("Fetched gas price: {} Gwei", price);
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ORACLE_BODY: &str = r#"{
        "status": "1",
        "message": "OK",
        "result": {
            "LastBlock": "18500000",
            "SafeGasPrice": "32.5",
            "ProposeGasPrice": "33.1",
            "FastGasPrice": "35.0"
        }
    }"#;

    async fn client_for(server: &MockServer) -> EtherscanClient {
        EtherscanClient::new(server.uri(), Some("test-key".to_string()))
    }

    #[tokio::test]
    async fn fetches_and_parses_safe_gas_price() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("module", "gastracker"))
            .and(query_param("action", "gasoracle"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(ORACLE_BODY, "application/json"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let price = client.current_gas_price().await.unwrap();
        assert_eq!(price, 32.5);
    }

    #[tokio::test]
    async fn missing_api_key_is_a_config_error() {
        let client = EtherscanClient::new("http://localhost".to_string(), None);
        let err = client.current_gas_price().await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[tokio::test]
    async fn upstream_status_zero_is_a_network_error() {
        let server = MockServer::start().await;
        let body = r#"{"status": "0", "message": "NOTOK", "result": "Invalid API Key"}"#;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.current_gas_price().await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
    }

    #[tokio::test]
    async fn http_error_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.current_gas_price().await.unwrap_err();
        assert!(matches!(err, AppError::Network(_)));
    }

    #[tokio::test]
    async fn retries_once_after_a_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(ORACLE_BODY, "application/json"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let price = client.current_gas_price().await.unwrap();
        assert_eq!(price, 32.5);
    }
}
