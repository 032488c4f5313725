//! Bounded rolling history of gas price observations.
//!
//! `HistoryBuffer` holds the most recent `window_size` observations in
//! arrival order. When the buffer is full the oldest entry is evicted
//! before the new one is inserted (ring-buffer semantics backed by
//! `VecDeque`).
//!
//! The buffer lives for the whole process and is owned by a single
//! [`GasForecaster`](crate::forecast::forecaster::GasForecaster); there is
//! no reset operation other than eviction.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::forecast::types::Observation;

/// Default number of observations retained (48 hourly samples).
pub const DEFAULT_WINDOW_SIZE: usize = 48;

/// Capacity-bounded FIFO of [`Observation`] values.
#[derive(Debug)]
pub struct HistoryBuffer {
    data: VecDeque<Observation>,
    window_size: usize,
}

impl HistoryBuffer {
    /// Create a new buffer retaining at most `window_size` observations.
    pub fn new(window_size: usize) -> Self {
        Self {
            data: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    /// Record `price` at the current wall-clock time. Always succeeds.
    pub fn append(&mut self, price: f64) {
        self.append_at(price, Local::now());
    }

    /// Record `price` at an explicit timestamp. Used for backfill and for
    /// deterministic tests; `append` delegates here.
    pub fn append_at(&mut self, price: f64, timestamp: DateTime<Local>) {
        if self.data.len() >= self.window_size {
            self.data.pop_front();
        }
        self.data.push_back(Observation::at(price, timestamp));
    }

    /// Current contents, oldest first.
    pub fn window(&self) -> impl Iterator<Item = &Observation> {
        self.data.iter()
    }

    /// Prices in the window, oldest first.
    pub fn prices(&self) -> Vec<f64> {
        self.data.iter().map(|obs| obs.price).collect()
    }

    /// `true` once the buffer holds exactly `window_size` observations.
    pub fn is_full(&self) -> bool {
        self.data.len() == self.window_size
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}
