//! Single-slot cache for the analytics response.
//!
//! The slot is invalidated purely by age. Callers inside the window share the
//! same `Arc`, so they see identical output including the timestamp.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::analytics::AnalyticsResponse;

pub const ANALYTICS_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CachedAnalytics {
    computed_at: Instant,
    response: Arc<AnalyticsResponse>,
}

pub struct AnalyticsCache {
    ttl: Duration,
    slot: Mutex<Option<CachedAnalytics>>,
}

impl Default for AnalyticsCache {
    fn default() -> Self {
        Self::with_ttl(ANALYTICS_CACHE_TTL)
    }
}

impl AnalyticsCache {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    // The slot only ever holds a finished value, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, Option<CachedAnalytics>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The cached response, if it was computed less than one TTL before `now`.
    pub fn get(&self, now: Instant) -> Option<Arc<AnalyticsResponse>> {
        let slot = self.lock();
        slot.as_ref()
            .filter(|cached| now.saturating_duration_since(cached.computed_at) < self.ttl)
            .map(|cached| Arc::clone(&cached.response))
    }

    /// Overwrite the slot. Concurrent misses may both store; the last one wins.
    pub fn store(&self, now: Instant, response: AnalyticsResponse) -> Arc<AnalyticsResponse> {
        let response = Arc::new(response);
        *self.lock() = Some(CachedAnalytics {
            computed_at: now,
            response: Arc::clone(&response),
        });
        response
    }

    /// Age of the cached entry, whether or not it has expired.
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.lock()
            .as_ref()
            .map(|cached| now.saturating_duration_since(cached.computed_at))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
