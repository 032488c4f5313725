//! Trend summarization over a produced forecast.

use crate::forecast::types::{ForecastPoint, TrendDirection, TrendSummary};

/// Derives the directional summary and the best time slot from a forecast.
pub struct TrendSummarizer;

impl TrendSummarizer {
    /// Summarize `forecast` against `current_price`.
    ///
    /// Direction is `Up` only when the last point is strictly above the
    /// current price; a tie reads as `Down`. `volatility` is the
    /// long-window value from the statistics engine, passed through.
    pub fn summarize(
        forecast: &[ForecastPoint],
        current_price: f64,
        volatility: f64,
    ) -> TrendSummary {
        let last_fee = forecast.last().map(|p| p.predicted_fee).unwrap_or(current_price);

        let direction = if last_fee > current_price {
            TrendDirection::Up
        } else {
            TrendDirection::Down
        };

        let percentage = if current_price == 0.0 {
            0.0
        } else {
            (last_fee - current_price).abs() / current_price * 100.0
        };

        TrendSummary {
            direction,
            percentage,
            volatility,
        }
    }

    /// The forecast point with the lowest predicted fee (first minimum on
    /// ties). `None` only for an empty forecast.
    pub fn best_time_slot(forecast: &[ForecastPoint]) -> Option<ForecastPoint> {
        let mut best: Option<&ForecastPoint> = None;
        for point in forecast {
            // Strict less-than keeps the earliest of equal minima.
            if best.map_or(true, |b| point.predicted_fee < b.predicted_fee) {
                best = Some(point);
            }
        }
        best.cloned()
    }
}
