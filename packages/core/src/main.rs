use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use tokio::sync::Mutex;

use gas_fee_forecaster::api;
use gas_fee_forecaster::api::predictions::PredictionsApiState;
use gas_fee_forecaster::cache::ResponseCache;
use gas_fee_forecaster::cli::Cli;
use gas_fee_forecaster::config::Config;
use gas_fee_forecaster::error::AppError;
use gas_fee_forecaster::forecast::{ForecastConfig, GasForecaster};
use gas_fee_forecaster::logging::init_logging;
use gas_fee_forecaster::metrics::AppMetrics;
use gas_fee_forecaster::sampler;
use gas_fee_forecaster::services::etherscan::{EtherscanClient, GasPriceProvider};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();

    let mut config = Config::from_env()
        .map_err(AppError::Config)
        .unwrap_or_else(|err| {
            tracing::error!("{}", err);
            std::process::exit(1);
        });

    let cli = Cli::parse();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(url) = cli.etherscan_url {
        config.etherscan_url = url;
    }
    if let Some(path) = cli.model_path {
        config.model_path = path;
    }
    if let Some(interval) = cli.sample_interval {
        config.sample_interval_seconds = interval;
    }

    tracing::info!("Service started with config: {:?}", config);

    // Predictor lifecycle is explicit: construct, optionally restore the
    // artifact, serve, save on shutdown.
    let mut forecaster = GasForecaster::new(ForecastConfig::default());
    let model_path = PathBuf::from(&config.model_path);
    if model_path.exists() {
        match forecaster.load_model(&model_path) {
            Ok(()) => tracing::info!("Restored model artifact from {}", model_path.display()),
            Err(err) => tracing::error!(
                "Rejected model artifact {}, starting untrained: {}",
                model_path.display(),
                err
            ),
        }
    }
    let forecaster = Arc::new(Mutex::new(forecaster));

    let provider: Arc<dyn GasPriceProvider + Send + Sync> = Arc::new(EtherscanClient::new(
        config.etherscan_url.clone(),
        config.etherscan_api_key.clone(),
    ));

    let metrics = Arc::new(AppMetrics::new().unwrap_or_else(|err| {
        tracing::error!("Failed to register metrics: {}", err);
        std::process::exit(1);
    }));

    let state = Arc::new(PredictionsApiState {
        gas_provider: provider.clone(),
        forecaster: forecaster.clone(),
        cache: Arc::new(Mutex::new(ResponseCache::new(Duration::from_secs(
            config.cache_ttl_seconds,
        )))),
        metrics: metrics.clone(),
    });

    let app = api::create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|err| {
            tracing::error!("Failed to bind {}: {}", addr, err);
            std::process::exit(1);
        });
    tracing::info!("Listening on {}", addr);

    let server = tokio::spawn(async move {
        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
        };
        if let Err(err) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
        {
            tracing::error!("Server error: {}", err);
        }
    });

    // Runs until Ctrl+C.
    sampler::run_gas_sampling(
        provider,
        forecaster.clone(),
        metrics,
        config.sample_interval_seconds,
    )
    .await;

    // Persist what was learned before exiting.
    let forecaster = forecaster.lock().await;
    if forecaster.is_model_trained() {
        if let Err(err) = forecaster.save_model(&model_path) {
            tracing::error!("Failed to save model artifact: {}", err);
        }
    }

    let _ = server.await;
}
