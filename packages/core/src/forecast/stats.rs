//! Window statistics over the observation history.
//!
//! All three signals are recomputed from the current
//! [`HistoryBuffer`](crate::forecast::history::HistoryBuffer) snapshot on
//! every call; nothing is cached here.

use crate::forecast::history::HistoryBuffer;

/// Volatility reported while the window is not yet full.
pub const DEFAULT_VOLATILITY: f64 = 0.02;

/// Upper bound on the long-window volatility ratio. A single outlier must
/// not produce a runaway confidence penalty.
pub const MAX_VOLATILITY: f64 = 0.1;

/// Number of most recent observations used for the congestion signal.
const CONGESTION_WINDOW: usize = 5;

/// Upper bound on the congestion index.
const MAX_CONGESTION: f64 = 1.3;

/// Statistics over a [`HistoryBuffer`] snapshot.
pub struct StatisticsEngine;

impl StatisticsEngine {
    /// Mean price over the full window.
    ///
    /// Returns `None` until the buffer is full; an average over too few
    /// samples is not reported.
    pub fn moving_average(history: &HistoryBuffer) -> Option<f64> {
        if !history.is_full() {
            return None;
        }
        Some(mean(&history.prices()))
    }

    /// Long-window volatility: population standard deviation of prices
    /// divided by their mean, capped at [`MAX_VOLATILITY`].
    ///
    /// Returns [`DEFAULT_VOLATILITY`] until the buffer is full. A full
    /// window of identical prices yields exactly `0.0`.
    pub fn volatility(history: &HistoryBuffer) -> f64 {
        if !history.is_full() {
            return DEFAULT_VOLATILITY;
        }
        let prices = history.prices();
        let mean = mean(&prices);
        if mean == 0.0 {
            return 0.0;
        }
        (std_dev(&prices) / mean).min(MAX_VOLATILITY)
    }

    /// Short-window congestion index over the last 5 observations:
    /// `1 + stdev/mean`, capped at 1.3. Returns `1.0` with fewer than 2
    /// observations.
    pub fn network_congestion(history: &HistoryBuffer) -> f64 {
        if history.len() < 2 {
            return 1.0;
        }
        let prices = history.prices();
        let start = prices.len().saturating_sub(CONGESTION_WINDOW);
        let recent = &prices[start..];
        let mean = mean(recent);
        if mean == 0.0 {
            return 1.0;
        }
        (1.0 + std_dev(recent) / mean).min(MAX_CONGESTION)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    let mean = mean(values);
    let variance = values
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
