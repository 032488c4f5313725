//! Gas prediction API endpoints.
//!
//! One forecasting pass per cache miss: fetch the current price (falling
//! back to a constant when the oracle is down), run the serialized
//! observe → train → predict → summarize pipeline, and cache the payload
//! for the configured TTL. Conditional requests are answered with 304s.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::headers::{cache_control, compute_etag, if_none_match_matches, last_modified};
use crate::cache::ResponseCache;
use crate::config::FALLBACK_GAS_PRICE;
use crate::error::AppError;
use crate::forecast::{ForecastPoint, GasForecaster, TrendSummary};
use crate::metrics::AppMetrics;
use crate::services::etherscan::GasPriceProvider;

/// Shared state type for the prediction routes.
pub type PredictionsState = Arc<PredictionsApiState>;

pub struct PredictionsApiState {
    pub gas_provider: Arc<dyn GasPriceProvider + Send + Sync>,
    /// The single process-wide predictor. The mutex serializes the
    /// observe/train/predict sequence across concurrent requests.
    pub forecaster: Arc<Mutex<GasForecaster>>,
    pub cache: Arc<Mutex<ResponseCache<PredictionsResponse>>>,
    pub metrics: Arc<AppMetrics>,
}

/// Wire payload consumed by the dashboard frontend.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionsResponse {
    pub predictions: Vec<ForecastPoint>,
    pub current_gas: f64,
    pub best_time_slot: ForecastPoint,
    pub trend: TrendSummary,
    /// Unix epoch milliseconds at which the forecast was produced.
    pub timestamp: i64,
}

const PREDICTIONS_MAX_AGE: u32 = 60;
const PREDICTIONS_SWR: u32 = 30;

pub async fn get_predictions(
    State(state): State<PredictionsState>,
    request_headers: HeaderMap,
) -> Result<Response, AppError> {
    let cached = state.cache.lock().await.get();

    let payload = if let Some(cached) = cached {
        cached
    } else {
        let fresh = produce_forecast(&state).await?;
        state.cache.lock().await.set(fresh.clone());
        fresh
    };

    let body = serde_json::to_vec(&payload).map_err(|err| AppError::Parse(err.to_string()))?;
    let etag = compute_etag(&body);
    let last_modified_value = last_modified(Utc::now());

    if if_none_match_matches(&request_headers, &etag) {
        return Ok(Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header(header::CACHE_CONTROL, cache_control(PREDICTIONS_MAX_AGE, PREDICTIONS_SWR))
            .header(header::ETAG, etag.as_str())
            .header(header::LAST_MODIFIED, last_modified_value)
            .body(Body::empty())
            .expect("304 predictions response should be valid"));
    }

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CACHE_CONTROL, cache_control(PREDICTIONS_MAX_AGE, PREDICTIONS_SWR))
        .header(header::ETAG, etag.as_str())
        .header(header::LAST_MODIFIED, last_modified_value)
        .body(Body::from(body))
        .expect("predictions response should be valid"))
}

/// Run the full forecasting pipeline once.
async fn produce_forecast(state: &PredictionsState) -> Result<PredictionsResponse, AppError> {
    state.metrics.oracle_fetches_total.inc();
    let current_gas = match state.gas_provider.current_gas_price().await {
        Ok(price) => price,
        Err(err) => {
            state.metrics.oracle_fetch_errors_total.inc();
            tracing::warn!(
                "Gas oracle unavailable, using fallback {} Gwei: {}",
                FALLBACK_GAS_PRICE,
                err
            );
            FALLBACK_GAS_PRICE
        }
    };

    let forecast = {
        let mut forecaster = state.forecaster.lock().await;
        let hours = forecaster.config().horizon_hours;
        let forecast = forecaster
            .forecast(current_gas, hours)
            .map_err(|err| AppError::Unknown(err.to_string()))?;

        state.metrics.model_trainings_total.inc();
        state
            .metrics
            .observations_stored
            .set(forecaster.observation_count() as f64);
        forecast
    };

    state.metrics.current_gas_price.set(current_gas);
    state.metrics.forecasts_total.inc();

    Ok(PredictionsResponse {
        predictions: forecast.predictions,
        current_gas: forecast.current_gas,
        best_time_slot: forecast.best_time_slot,
        trend: forecast.trend,
        timestamp: Utc::now().timestamp_millis(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration as StdDuration;

    use async_trait::async_trait;
    use axum::{
        body::to_bytes,
        http::{Request, StatusCode},
        routing::get,
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::forecast::ForecastConfig;

    struct MockGasProvider {
        price: Result<f64, ()>,
        calls: AtomicUsize,
    }

    impl MockGasProvider {
        fn ok(price: f64) -> Self {
            Self {
                price: Ok(price),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                price: Err(()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GasPriceProvider for MockGasProvider {
        async fn current_gas_price(&self) -> Result<f64, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.price
                .map_err(|_| AppError::Network("oracle down".to_string()))
        }
    }

    fn make_state(provider: Arc<MockGasProvider>) -> PredictionsState {
        Arc::new(PredictionsApiState {
            gas_provider: provider,
            forecaster: Arc::new(Mutex::new(GasForecaster::new(ForecastConfig::default()))),
            cache: Arc::new(Mutex::new(ResponseCache::new(StdDuration::from_secs(60)))),
            metrics: Arc::new(AppMetrics::new().unwrap()),
        })
    }

    fn make_app(state: PredictionsState) -> Router {
        Router::new()
            .route("/predict", get(get_predictions))
            .route("/dashboard/api/predictions", get(get_predictions))
            .with_state(state)
    }

    async fn get_json(app: Router, uri: &str) -> Value {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn predictions_payload_has_expected_shape() {
        let provider = Arc::new(MockGasProvider::ok(50.0));
        let app = make_app(make_state(provider));

        let json = get_json(app, "/predict").await;
        assert_eq!(json["currentGas"], 50.0);
        assert_eq!(json["predictions"].as_array().unwrap().len(), 6);
        assert_eq!(json["bestTimeSlot"]["predictedFee"], 50.0);
        assert!(json["trend"]["direction"] == "up" || json["trend"]["direction"] == "down");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn cold_start_predictions_equal_current_price() {
        let provider = Arc::new(MockGasProvider::ok(50.0));
        let app = make_app(make_state(provider));

        let json = get_json(app, "/predict").await;
        for point in json["predictions"].as_array().unwrap() {
            assert_eq!(point["predictedFee"], 50.0);
            let confidence = point["confidence"].as_f64().unwrap();
            assert!((0.3..=0.9).contains(&confidence));
        }
    }

    #[tokio::test]
    async fn oracle_failure_falls_back_to_default_price() {
        let provider = Arc::new(MockGasProvider::failing());
        let app = make_app(make_state(provider));

        let json = get_json(app, "/predict").await;
        assert_eq!(json["currentGas"], FALLBACK_GAS_PRICE);
        assert_eq!(json["predictions"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn second_request_within_ttl_is_served_from_cache() {
        let provider = Arc::new(MockGasProvider::ok(42.0));
        let state = make_state(provider.clone());

        let app = make_app(state.clone());
        let _ = get_json(app, "/predict").await;
        let app = make_app(state);
        let _ = get_json(app, "/predict").await;

        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn dashboard_route_serves_the_same_payload() {
        let provider = Arc::new(MockGasProvider::ok(42.0));
        let state = make_state(provider);

        let app = make_app(state.clone());
        let a = get_json(app, "/predict").await;
        let app = make_app(state);
        let b = get_json(app, "/dashboard/api/predictions").await;

        assert_eq!(a["currentGas"], b["currentGas"]);
        assert_eq!(a["predictions"], b["predictions"]);
    }

    #[tokio::test]
    async fn matching_if_none_match_returns_304() {
        let provider = Arc::new(MockGasProvider::ok(42.0));
        let state = make_state(provider);

        let app = make_app(state.clone());
        let response = app
            .oneshot(Request::builder().uri("/predict").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let etag = response
            .headers()
            .get(header::ETAG)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let app = make_app(state);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/predict")
                    .header(header::IF_NONE_MATCH, etag)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn repeated_requests_accumulate_observations() {
        let provider = Arc::new(MockGasProvider::ok(42.0));
        let state = make_state(provider);

        for _ in 0..3 {
            state.cache.lock().await.invalidate();
            let app = make_app(state.clone());
            let _ = get_json(app, "/predict").await;
        }

        assert_eq!(state.forecaster.lock().await.observation_count(), 3);
        assert!(state.forecaster.lock().await.is_model_trained());
    }
}
