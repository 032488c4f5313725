use std::time::{Duration, Instant};

/// In-memory TTL cache for a single clonable response value.
///
/// The predictions endpoint caches its full payload here for the
/// configured TTL so a burst of dashboard requests triggers only one
/// observe/train/predict cycle per minute.
pub struct ResponseCache<T: Clone> {
    entry: Option<(T, Instant)>,
    ttl: Duration,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    /// Returns cached value only when still within TTL.
    pub fn get(&self) -> Option<T> {
        match &self.entry {
            Some((value, cached_at)) if cached_at.elapsed() <= self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, value: T) {
        self.entry = Some((value, Instant::now()));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_fresh(&self) -> bool {
        matches!(&self.entry, Some((_, cached_at)) if cached_at.elapsed() <= self.ttl)
    }
}
