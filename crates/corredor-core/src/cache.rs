//! Time-bounded single-value cache.
//!
//! Replaces ambient module-global caches with an explicit slot carrying its
//! expiry instant. Callers pass `now` on every access, which keeps expiry
//! behavior deterministic under test.

use std::time::{Duration, Instant};

/// A single cached value with a fixed time-to-live.
#[derive(Debug)]
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Option<(T, Instant)>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    /// Return the cached value if it has not expired at `now`.
    pub fn get(&self, now: Instant) -> Option<T> {
        match &self.slot {
            Some((value, expires_at)) if now < *expires_at => Some(value.clone()),
            _ => None,
        }
    }

    /// Store a value, valid for the configured TTL from `now`.
    pub fn put(&mut self, value: T, now: Instant) {
        self.slot = Some((value, now + self.ttl));
    }

    /// Drop the cached value, forcing the next `get` to miss.
    pub fn clear(&mut self) {
        self.slot = None;
    }
}
