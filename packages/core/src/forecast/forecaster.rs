//! Gas price forecaster - central orchestrator for the prediction pipeline.
//!
//! One `GasForecaster` instance exists per process. It exclusively owns the
//! observation history and the regression model, and a forecasting request
//! runs strictly observe → train → predict_horizon → summarize. Callers
//! that handle concurrent requests must serialize access (the HTTP layer
//! wraps the forecaster in `Arc<Mutex<_>>`): training assumes the model
//! reflects exactly the buffer state just appended.

use std::path::Path;

use chrono::{Datelike, Duration, Local, Timelike};

use crate::forecast::config::ForecastConfig;
use crate::forecast::error::ForecastError;
use crate::forecast::history::HistoryBuffer;
use crate::forecast::model::{FeeRegressor, RandomForestModel};
use crate::forecast::peak::PeakHourClassifier;
use crate::forecast::stats::StatisticsEngine;
use crate::forecast::trend::TrendSummarizer;
use crate::forecast::types::{FeatureVector, ForecastPoint, TrendSummary};

/// Base confidence before penalties are applied.
const BASE_CONFIDENCE: f64 = 0.8;
/// Confidence penalty for peak hours.
const PEAK_PENALTY: f64 = 0.1;
/// Confidence penalty per Gwei of predicted change.
const CHANGE_PENALTY_WEIGHT: f64 = 0.5;
const MIN_CONFIDENCE: f64 = 0.3;
const MAX_CONFIDENCE: f64 = 0.9;

/// Result of a full forecasting pass.
#[derive(Debug, Clone)]
pub struct GasForecast {
    pub predictions: Vec<ForecastPoint>,
    pub current_gas: f64,
    pub best_time_slot: ForecastPoint,
    pub trend: TrendSummary,
}

/// Orchestrates history, model, statistics, and peak classification into
/// multi-step-ahead forecasts.
pub struct GasForecaster {
    config: ForecastConfig,
    history: HistoryBuffer,
    model: Box<dyn FeeRegressor>,
    peaks: PeakHourClassifier,
}

impl GasForecaster {
    /// Forecaster with the production random forest model.
    pub fn new(config: ForecastConfig) -> Self {
        let model = RandomForestModel::new(config.n_trees, config.seed);
        Self::with_model(config, Box::new(model))
    }

    /// Forecaster with an explicit regression strategy.
    pub fn with_model(config: ForecastConfig, model: Box<dyn FeeRegressor>) -> Self {
        let history = HistoryBuffer::new(config.window_size);
        let peaks = PeakHourClassifier::new(config.peak_hours.clone());
        Self {
            config,
            history,
            model,
            peaks,
        }
    }

    /// Record a new price observation and retrain on the full window.
    pub fn observe(&mut self, price: f64) {
        self.history.append(price);
        self.train();
    }

    /// Seed the history window from a batch of historical prices, spaced
    /// one hour apart ending now, then retrain. The window bound applies:
    /// only the most recent `window_size` prices survive.
    pub fn backfill(&mut self, prices: &[f64]) {
        let now = Local::now();
        let first = now - Duration::hours(prices.len().saturating_sub(1) as i64);
        for (i, price) in prices.iter().enumerate() {
            self.history.append_at(*price, first + Duration::hours(i as i64));
        }
        self.train();
    }

    /// Fit the model on every observation currently in the window.
    fn train(&mut self) {
        let samples: Vec<(FeatureVector, f64)> = self
            .history
            .window()
            .map(|obs| (FeatureVector::from_observation(obs), obs.price))
            .collect();
        self.model.train(&samples);
    }

    /// Produce one [`ForecastPoint`] per future hour `0..hours`, spaced one
    /// hour apart starting now.
    ///
    /// Pure computation apart from wall-clock "now", which drives the
    /// timestamps and the weekend/weekday selection for peak classification.
    pub fn predict_horizon(
        &self,
        current_price: f64,
        hours: usize,
    ) -> Result<Vec<ForecastPoint>, ForecastError> {
        if hours == 0 {
            return Err(ForecastError::InvalidHorizon { hours });
        }

        let now = Local::now();
        // Day type comes from the current day, not the forecasted hour's
        // own day, so a horizon crossing midnight keeps one classification.
        let is_weekend = now.weekday().num_days_from_monday() >= 5;

        let mut predictions = Vec::with_capacity(hours);
        for i in 0..hours {
            let future = now + Duration::hours(i as i64);
            let feature = FeatureVector {
                price: current_price,
                hour: future.hour(),
                day_of_week: future.weekday().num_days_from_monday(),
            };

            let raw = self.model.predict(&feature);
            let rounded = round2(raw);
            let predicted_fee = validate_prediction(rounded, current_price);
            let confidence = self.confidence(
                feature.hour,
                is_weekend,
                predicted_fee - current_price,
            );

            predictions.push(ForecastPoint {
                timestamp: future.timestamp_millis(),
                predicted_fee,
                confidence,
            });
        }

        Ok(predictions)
    }

    /// Full pipeline: observe the current price, retrain, forecast the
    /// horizon, and summarize. Always produces a forecast for `hours >= 1`,
    /// even on a cold start (every point equals the current price).
    pub fn forecast(
        &mut self,
        current_price: f64,
        hours: usize,
    ) -> Result<GasForecast, ForecastError> {
        self.observe(current_price);
        let predictions = self.predict_horizon(current_price, hours)?;

        let trend =
            TrendSummarizer::summarize(&predictions, current_price, self.volatility());
        let best_time_slot = TrendSummarizer::best_time_slot(&predictions)
            .unwrap_or(ForecastPoint {
                timestamp: Local::now().timestamp_millis(),
                predicted_fee: current_price,
                confidence: MIN_CONFIDENCE,
            });

        Ok(GasForecast {
            predictions,
            current_gas: current_price,
            best_time_slot,
            trend,
        })
    }

    fn confidence(&self, hour: u32, is_weekend: bool, change: f64) -> f64 {
        let peak_penalty = if self.peaks.is_peak(hour, is_weekend) {
            PEAK_PENALTY
        } else {
            0.0
        };
        let change_penalty = change.abs() * CHANGE_PENALTY_WEIGHT;
        (BASE_CONFIDENCE - peak_penalty - change_penalty).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    }

    /// Long-window volatility of the current history.
    pub fn volatility(&self) -> f64 {
        StatisticsEngine::volatility(&self.history)
    }

    /// Moving average over the full window, when available.
    pub fn moving_average(&self) -> Option<f64> {
        StatisticsEngine::moving_average(&self.history)
    }

    /// Short-window congestion index.
    pub fn network_congestion(&self) -> f64 {
        StatisticsEngine::network_congestion(&self.history)
    }

    pub fn observation_count(&self) -> usize {
        self.history.len()
    }

    pub fn is_model_trained(&self) -> bool {
        self.model.is_trained()
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Persist the trained model artifact.
    pub fn save_model(&self, path: &Path) -> Result<(), ForecastError> {
        self.model.save(path)
    }

    /// Restore a model artifact; schema mismatches surface as errors.
    pub fn load_model(&mut self, path: &Path) -> Result<(), ForecastError> {
        self.model.load(path)
    }
}

/// Round to 2 decimal places, matching the serialized precision.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Second, stricter sanity gate after the model's own ±20% band: a
/// prediction deviating from the current price by more than
/// `max(1, 5% of current)` is replaced by `current ± 1` in the deviation's
/// direction.
fn validate_prediction(predicted: f64, current_price: f64) -> f64 {
    let max_allowed_diff = (current_price * 0.05).max(1.0);
    if (predicted - current_price).abs() > max_allowed_diff {
        if predicted > current_price {
            current_price + 1.0
        } else {
            current_price - 1.0
        }
    } else {
        predicted
    }
}
