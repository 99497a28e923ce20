//! # Result cache
//! Time-bounded store: canonical URL → last successful live analysis.
//!
//! Staleness is checked lazily on read; there is no sweep. Writes are a
//! single upsert, so concurrent writers for the same URL race benignly
//! (last writer wins). Fallback results are never stored.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::types::Analysis;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub data: Analysis,
    pub stored_at_ms: i64,
}

pub trait ResultCache: Send + Sync {
    /// Live entry for `key` no older than `max_age`.
    fn get(&self, key: &str, max_age: Duration) -> Option<CacheEntry>;
    /// Replace the entry for `key`. Non-live analyses are ignored.
    fn put(&self, key: &str, value: Analysis);
}

/// In-process cache shared across requests.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str, max_age: Duration) -> Option<CacheEntry> {
        let entry = {
            let guard = self.entries.read().unwrap_or_else(|p| p.into_inner());
            guard.get(key).cloned()?
        };
        if !entry.data.provider.is_live() {
            return None;
        }
        let age_ms = self.clock.now().timestamp_millis() - entry.stored_at_ms;
        if age_ms < 0 || age_ms as u128 > max_age.as_millis() {
            debug!(key, age_ms, "cache entry stale");
            return None;
        }
        Some(entry)
    }

    fn put(&self, key: &str, value: Analysis) {
        if !value.provider.is_live() {
            debug!(key, "refusing to cache fallback analysis");
            return;
        }
        let entry = CacheEntry {
            data: value,
            stored_at_ms: self.clock.now().timestamp_millis(),
        };
        self.entries
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), entry);
    }
}
