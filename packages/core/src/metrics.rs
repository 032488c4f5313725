//! Prometheus metrics registry for the gas fee forecaster.
//!
//! [`AppMetrics`] owns all registered metrics and the [`Registry`] they
//! belong to. Construct it once at startup, wrap in `Arc`, and pass it
//! to the sampler and the HTTP handlers.
//!
//! Exposed at `GET /metrics` in Prometheus text exposition format
//! (`text/plain; version=0.0.4`).

use prometheus::{
    Counter, CounterVec, Gauge, Histogram, HistogramOpts, Opts, Registry,
};

/// All application-level Prometheus metrics.
pub struct AppMetrics {
    /// Total number of gas oracle fetch attempts (success + failure).
    pub oracle_fetches_total: Counter,
    /// Total number of failed gas oracle fetch attempts.
    pub oracle_fetch_errors_total: Counter,
    /// Current number of observations held in the history window.
    pub observations_stored: Gauge,
    /// Most recently observed gas price in Gwei.
    pub current_gas_price: Gauge,
    /// Total number of model training runs.
    pub model_trainings_total: Counter,
    /// Total number of forecast responses produced (cache misses).
    pub forecasts_total: Counter,
    /// HTTP request count, labelled by method, path, and status code.
    pub http_requests_total: CounterVec,
    /// HTTP request latency histogram in seconds.
    pub http_request_duration: Histogram,
    /// The registry that owns all of the above metrics.
    pub registry: Registry,
}

impl AppMetrics {
    /// Create and register all metrics. Returns an error if any metric
    /// name is invalid or duplicated (should not happen in practice).
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let oracle_fetches_total = Counter::with_opts(Opts::new(
            "gas_forecaster_oracle_fetches_total",
            "Total gas oracle fetch attempts",
        ))?;

        let oracle_fetch_errors_total = Counter::with_opts(Opts::new(
            "gas_forecaster_oracle_fetch_errors_total",
            "Failed gas oracle fetch attempts",
        ))?;

        let observations_stored = Gauge::with_opts(Opts::new(
            "gas_forecaster_observations_stored",
            "Current size of the observation history window",
        ))?;

        let current_gas_price = Gauge::with_opts(Opts::new(
            "gas_forecaster_current_gas_price_gwei",
            "Most recently observed gas price in Gwei",
        ))?;

        let model_trainings_total = Counter::with_opts(Opts::new(
            "gas_forecaster_model_trainings_total",
            "Total model training runs",
        ))?;

        let forecasts_total = Counter::with_opts(Opts::new(
            "gas_forecaster_forecasts_total",
            "Total forecast responses produced",
        ))?;

        let http_requests_total = CounterVec::new(
            Opts::new(
                "gas_forecaster_http_requests_total",
                "HTTP requests by method, path, and status",
            ),
            &["method", "path", "status"],
        )?;

        let http_request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "gas_forecaster_http_request_duration_seconds",
                "HTTP request latency in seconds",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        )?;

        registry.register(Box::new(oracle_fetches_total.clone()))?;
        registry.register(Box::new(oracle_fetch_errors_total.clone()))?;
        registry.register(Box::new(observations_stored.clone()))?;
        registry.register(Box::new(current_gas_price.clone()))?;
        registry.register(Box::new(model_trainings_total.clone()))?;
        registry.register(Box::new(forecasts_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration.clone()))?;

        Ok(Self {
            oracle_fetches_total,
            oracle_fetch_errors_total,
            observations_stored,
            current_gas_price,
            model_trainings_total,
            forecasts_total,
            http_requests_total,
            http_request_duration,
            registry,
        })
    }

    /// Render all metrics as Prometheus text format (for the `/metrics` endpoint).
    pub fn render(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&metric_families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_metrics_register_without_error() {
        let metrics = AppMetrics::new();
        assert!(metrics.is_ok(), "AppMetrics::new() failed: {:?}", metrics.err());
    }

    #[test]
    fn render_produces_output_after_increment() {
        let metrics = AppMetrics::new().unwrap();
        metrics.oracle_fetches_total.inc();
        let output = metrics.render().unwrap();
        assert!(output.contains("gas_forecaster_oracle_fetches_total"));
    }

    #[test]
    fn counters_increment_correctly() {
        let metrics = AppMetrics::new().unwrap();
        metrics.oracle_fetches_total.inc_by(3.0);
        metrics.oracle_fetch_errors_total.inc();
        assert!((metrics.oracle_fetches_total.get() - 3.0).abs() < f64::EPSILON);
        assert!((metrics.oracle_fetch_errors_total.get() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gauge_set_and_get() {
        let metrics = AppMetrics::new().unwrap();
        metrics.current_gas_price.set(42.5);
        assert!((metrics.current_gas_price.get() - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn http_requests_counter_vec_labels_work() {
        let metrics = AppMetrics::new().unwrap();
        metrics
            .http_requests_total
            .with_label_values(&["GET", "/predict", "200"])
            .inc();
        let val = metrics
            .http_requests_total
            .with_label_values(&["GET", "/predict", "200"])
            .get();
        assert!((val - 1.0).abs() < f64::EPSILON);
    }
}
