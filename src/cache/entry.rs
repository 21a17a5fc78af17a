//! Cache Entry Module
//!
//! Value plus the instant it was fetched, for caches with a freshness window.

use std::time::{Duration, Instant};

// == Timed Entry ==
/// A cached value stamped with its fetch time.
#[derive(Debug, Clone)]
pub struct TimedEntry<V> {
    /// The stored value
    pub value: V,
    /// When the value was read from the source of truth
    pub fetched_at: Instant,
}

impl<V> TimedEntry<V> {
    // == Constructor ==
    pub fn new(value: V, fetched_at: Instant) -> Self {
        Self { value, fetched_at }
    }

    // == Is Fresh ==
    /// Checks whether the entry may still be served at `now`.
    ///
    /// Boundary condition: fresh while `now - fetched_at < ttl`. Once the full
    /// TTL has elapsed the entry is stale and must be rebuilt.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }

    // == Age ==
    /// Time elapsed since the value was fetched.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }
}
