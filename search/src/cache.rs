//! Bounded, time-limited memo of recent result pages.
//!
//! Entries live in insertion order: reads use `peek` and never refresh an
//! entry, so the oldest-inserted entry is always the next to expire and the
//! first to be evicted. Every operation is infallible; a missing or expired
//! entry is a miss and the caller fetches again.

use crate::page::SearchPage;
use crate::query::CacheKey;
use lru::LruCache;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use tracing::trace;

pub const DEFAULT_CAPACITY: usize = 100;
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

static GLOBAL: Lazy<Arc<ScopedCache>> =
    Lazy::new(|| Arc::new(ScopedCache::new(DEFAULT_CAPACITY, DEFAULT_TTL)));

#[derive(Debug)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub page: SearchPage,
    pub inserted_at: Instant,
}

pub struct ScopedCache {
    capacity: usize,
    ttl: Duration,
    entries: Mutex<LruCache<CacheKey, Arc<CacheEntry>>>,
}

impl ScopedCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    /// Process-wide cache shared by every overlay in this process.
    pub fn global() -> Arc<ScopedCache> {
        Arc::clone(&GLOBAL)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        let now = Instant::now();
        let mut entries = self.lock();
        let entry = Arc::clone(entries.peek(key)?);
        if self.is_fresh(&entry, now) {
            debug!("search cache hit for {key}");
            return Some(entry);
        }
        entries.pop(key);
        trace!("search cache entry {key} expired");
        None
    }

    pub fn set(&self, key: CacheKey, page: SearchPage) -> Arc<CacheEntry> {
        let now = Instant::now();
        let entry = Arc::new(CacheEntry {
            key: key.clone(),
            page,
            inserted_at: now,
        });
        let mut entries = self.lock();
        entries.put(key, Arc::clone(&entry));
        self.prune_locked(&mut entries, now);
        entry
    }

    /// Drops every entry recorded under `scope_id`; other scopes are untouched.
    pub fn invalidate_scope(&self, scope_id: &str) -> usize {
        let mut entries = self.lock();
        let doomed: Vec<CacheKey> = entries
            .iter()
            .filter(|(key, _)| key.in_scope(scope_id))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            entries.pop(key);
        }
        if !doomed.is_empty() {
            debug!(
                "invalidated {} search cache entries for scope {scope_id}",
                doomed.len()
            );
        }
        doomed.len()
    }

    /// Removes expired entries, then evicts the oldest-inserted ones until the
    /// cache is within capacity. Returns how many entries were removed.
    pub fn prune(&self) -> usize {
        let mut entries = self.lock();
        self.prune_locked(&mut entries, Instant::now())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.duration_since(entry.inserted_at) < self.ttl
    }

    fn prune_locked(
        &self,
        entries: &mut LruCache<CacheKey, Arc<CacheEntry>>,
        now: Instant,
    ) -> usize {
        let mut removed = 0;
        loop {
            let expired = entries
                .peek_lru()
                .is_some_and(|(_, oldest)| !self.is_fresh(oldest, now));
            if !expired {
                break;
            }
            if let Some((key, _)) = entries.pop_lru() {
                trace!("search cache entry {key} expired");
                removed += 1;
            }
        }
        while entries.len() > self.capacity {
            let Some((key, _)) = entries.pop_lru() else {
                break;
            };
            trace!("search cache evicted {key}");
            removed += 1;
        }
        removed
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, Arc<CacheEntry>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for ScopedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .field("len", &self.len())
            .finish()
    }
}
