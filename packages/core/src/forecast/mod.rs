//! Gas Price Forecasting Module
//!
//! Maintains a bounded rolling history of observed network fees, fits a
//! random-forest regressor online, and produces short-horizon multi-point
//! forecasts with calibrated confidence, sanity clamps, and a trend/best-slot
//! summary.

pub mod config;
pub mod error;
pub mod forecaster;
pub mod history;
pub mod model;
pub mod peak;
pub mod stats;
pub mod trend;
pub mod types;


pub use config::{ForecastConfig, PeakHours};
pub use error::ForecastError;
pub use forecaster::{GasForecast, GasForecaster};
pub use history::HistoryBuffer;
pub use model::{FeeRegressor, RandomForestModel};
pub use peak::PeakHourClassifier;
pub use stats::StatisticsEngine;
pub use trend::TrendSummarizer;
pub use types::*;
