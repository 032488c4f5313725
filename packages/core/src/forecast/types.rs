//! Core data types for gas price forecasting

use chrono::{DateTime, Datelike, Local, Timelike};
use serde::{Deserialize, Serialize};

/// A single observed gas price reading with derived calendar features.
///
/// Immutable once stored; owned exclusively by the
/// [`HistoryBuffer`](crate::forecast::history::HistoryBuffer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Local>,
    /// Gas price in Gwei.
    pub price: f64,
    /// Hour of day, 0..=23.
    pub hour: u32,
    /// Day of week, Monday = 0 .. Sunday = 6.
    pub day_of_week: u32,
}

impl Observation {
    /// Build an observation for `price` at `timestamp`, deriving the
    /// calendar features from the timestamp.
    pub fn at(price: f64, timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            price,
            hour: timestamp.hour(),
            day_of_week: timestamp.weekday().num_days_from_monday(),
        }
    }
}

/// Input row for the regression model.
///
/// Column order is fixed (`price`, `hour`, `day_of_week`); the artifact
/// schema (see [`model`](crate::forecast::model)) records the same list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub price: f64,
    pub hour: u32,
    pub day_of_week: u32,
}

impl FeatureVector {
    pub fn from_observation(obs: &Observation) -> Self {
        Self {
            price: obs.price,
            hour: obs.hour,
            day_of_week: obs.day_of_week,
        }
    }

    /// Flatten into the model's numeric row.
    pub fn to_row(&self) -> Vec<f64> {
        vec![self.price, f64::from(self.hour), f64::from(self.day_of_week)]
    }
}

/// One point of the hourly forecast, serialized for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    /// Unix epoch milliseconds of the forecasted hour.
    pub timestamp: i64,
    /// Predicted gas price in Gwei, rounded to 2 decimal places.
    pub predicted_fee: f64,
    /// Calibrated confidence in `[0.3, 0.9]`.
    pub confidence: f64,
}

/// Direction of the forecasted price movement relative to the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

/// Directional summary of a forecast against the current price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSummary {
    pub direction: TrendDirection,
    /// Absolute percentage change from current price to the last point.
    pub percentage: f64,
    /// Long-window volatility of the observation history.
    pub volatility: f64,
}
