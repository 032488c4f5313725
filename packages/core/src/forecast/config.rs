//! Configuration for the forecasting engine

use serde::{Deserialize, Serialize};

/// Configuration for the gas forecaster and its components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of observations retained in the rolling history window.
    pub window_size: usize,
    /// Default number of hours to forecast ahead.
    pub horizon_hours: usize,
    /// Number of trees in the random forest.
    pub n_trees: u16,
    /// RNG seed for deterministic training.
    pub seed: u64,
    pub peak_hours: PeakHours,
}

/// Inclusive hour ranges with historically elevated congestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeakHours {
    pub weekday: Vec<(u32, u32)>,
    pub weekend: Vec<(u32, u32)>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window_size: 48,
            horizon_hours: 6,
            n_trees: 100,
            seed: 42,
            peak_hours: PeakHours::default(),
        }
    }
}

impl Default for PeakHours {
    fn default() -> Self {
        Self {
            weekday: vec![(8, 10), (16, 18)],
            weekend: vec![(10, 12), (14, 16)],
        }
    }
}
