//! Background gas price sampler.
//!
//! Keeps the history window warm between dashboard requests: each tick
//! fetches the current gas price from the oracle and feeds it to the
//! forecaster (which retrains on the updated window).
//!
//! A failed fetch skips the tick: appending the fallback constant into
//! the training window would bias the model, so the fallback is reserved
//! for the request path, which must always answer.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::Mutex;
use tokio::time;

use crate::forecast::GasForecaster;
use crate::metrics::AppMetrics;
use crate::services::etherscan::GasPriceProvider;

/// Run the sampling loop until `Ctrl+C` (SIGINT) is received.
pub async fn run_gas_sampling(
    provider: Arc<dyn GasPriceProvider + Send + Sync>,
    forecaster: Arc<Mutex<GasForecaster>>,
    metrics: Arc<AppMetrics>,
    sample_interval_seconds: u64,
) {
    let mut interval = time::interval(Duration::from_secs(sample_interval_seconds));

    tracing::info!(
        "Gas price sampling started (interval: {}s)",
        sample_interval_seconds
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                sample_once(&provider, &forecaster, &metrics).await;
            }

            _ = signal::ctrl_c() => {
                tracing::info!("Shutdown signal received. Stopping sampler.");
                break;
            }
        }
    }

    tracing::info!("Gas price sampling stopped cleanly");
}

/// Execute a single sample cycle. Extracted for testability.
async fn sample_once(
    provider: &Arc<dyn GasPriceProvider + Send + Sync>,
    forecaster: &Arc<Mutex<GasForecaster>>,
    metrics: &Arc<AppMetrics>,
) {
    metrics.oracle_fetches_total.inc();
    let price = match provider.current_gas_price().await {
        Ok(price) => price,
        Err(err) => {
            metrics.oracle_fetch_errors_total.inc();
            tracing::error!("Gas sampling error, skipping tick: {}", err);
            return;
        }
    };

    let mut forecaster = forecaster.lock().await;
    forecaster.observe(price);
    metrics.model_trainings_total.inc();
    metrics
        .observations_stored
        .set(forecaster.observation_count() as f64);
    metrics.current_gas_price.set(price);

    tracing::debug!(
        "Sampled {} Gwei, window now holds {} observations",
        price,
        forecaster.observation_count()
    );
}
