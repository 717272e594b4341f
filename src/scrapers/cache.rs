//! Single-slot, time-boxed memoization for the catalog queries.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Source of "now" for TTL checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A captured result list and when it was captured.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub items: Vec<T>,
    pub captured_at: DateTime<Utc>,
}

/// Holds at most one list of `T`; entries older than the TTL read as absent.
pub struct TtlCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<CacheEntry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Cached items, or `None` if empty or expired. Expired entries are evicted.
    pub fn read(&self) -> Option<Vec<T>> {
        let mut slot = self.slot.lock();
        let entry = slot.as_ref()?;
        let age = self.clock.now() - entry.captured_at;
        if age > self.ttl {
            debug!(age_secs = age.num_seconds(), "Cache entry expired");
            *slot = None;
            return None;
        }
        Some(entry.items.clone())
    }

    pub fn write(&self, items: Vec<T>) {
        *self.slot.lock() = Some(CacheEntry {
            items,
            captured_at: self.clock.now(),
        });
    }

    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    pub fn is_populated(&self) -> bool {
        self.slot.lock().is_some()
    }
}
