use std::env;

/// Default gas price (Gwei) used when the oracle cannot be reached.
pub const FALLBACK_GAS_PRICE: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct Config {
    /// Etherscan-style API base URL (the `/api` endpoint).
    pub etherscan_url: String,
    /// API key for the gas oracle. Optional: without it every fetch falls
    /// back to [`FALLBACK_GAS_PRICE`].
    pub etherscan_api_key: Option<String>,
    /// TCP port for the HTTP server.
    pub port: u16,
    /// Path of the model artifact loaded at startup and saved at shutdown.
    pub model_path: String,
    /// Seconds between background gas price samples.
    pub sample_interval_seconds: u64,
    /// TTL of the in-process predictions response cache, in seconds.
    pub cache_ttl_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let etherscan_url = env::var("ETHERSCAN_API_URL")
            .unwrap_or_else(|_| "https://api.etherscan.io/api".to_string());

        let etherscan_api_key = env::var("ETHERSCAN_API_KEY").ok();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| "PORT must be a valid port number")?,
            Err(_) => 8000,
        };

        let model_path =
            env::var("MODEL_PATH").unwrap_or_else(|_| "gas_price_model.json".to_string());

        let sample_interval_seconds = match env::var("SAMPLE_INTERVAL_SECONDS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| "SAMPLE_INTERVAL_SECONDS must be a valid number")?,
            Err(_) => 3600,
        };

        let cache_ttl_seconds = match env::var("CACHE_TTL_SECONDS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| "CACHE_TTL_SECONDS must be a valid number")?,
            Err(_) => 60,
        };

        Ok(Self {
            etherscan_url,
            etherscan_api_key,
            port,
            model_path,
            sample_interval_seconds,
            cache_ttl_seconds,
        })
    }
}
