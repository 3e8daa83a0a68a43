//! Query cache for backend reads.
//!
//! Entries live in a `moka` cache bounded by capacity and TTL. Each entry
//! tracks its own fetch state so that invalidation, in-flight fetches and
//! retry backoff compose:
//!
//! - a read of a fresh `Ready` entry is served from memory
//! - a stale, uninitialized or failed entry is fetched again
//! - invalidating an entry while a fetch is in flight keeps it stale after
//!   the fetch lands, so the next read goes back to the backend
//! - after a failed fetch, reads fail fast until the retry delay elapses

mod backoff;
mod key;
mod value;

pub use backoff::RetryPolicy;
pub use key::{Operation, QueryKey};
pub use value::{CacheValue, Cached};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::backend::BackendError;
use crate::error::QueryError;

/// Lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Uninitialized,
    Fetching,
    Ready,
    Failed,
}

/// Point-in-time view of an entry, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntrySnapshot {
    pub state: EntryState,
    pub stale: bool,
    pub in_flight: usize,
    pub failures: u32,
}

#[derive(Debug)]
struct Slot {
    state: EntryState,
    value: Option<CacheValue>,
    stale: bool,
    in_flight: usize,
    /// Bumped by every invalidation.
    generation: u64,
    failures: u32,
    retry_at: Option<Instant>,
    last_error: Option<Arc<BackendError>>,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            state: EntryState::Uninitialized,
            value: None,
            stale: false,
            in_flight: 0,
            generation: 0,
            failures: 0,
            retry_at: None,
            last_error: None,
        }
    }
}

#[derive(Debug, Default)]
struct Entry {
    slot: Mutex<Slot>,
}

/// Shared cache of backend reads.
///
/// Cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<QueryCacheInner>,
}

struct QueryCacheInner {
    entries: Cache<QueryKey, Arc<Entry>>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.entries.entry_count())
            .field("retry", &self.inner.retry)
            .finish()
    }
}

impl QueryCache {
    /// Create a cache holding at most `capacity` entries for `ttl` each.
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration, retry: RetryPolicy) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self {
            inner: Arc::new(QueryCacheInner { entries, retry }),
        }
    }

    async fn entry(&self, key: &QueryKey) -> Arc<Entry> {
        self.inner
            .entries
            .get_with(key.clone(), async { Arc::new(Entry::default()) })
            .await
    }

    /// Read `key`, calling `fetcher` only when no fresh value is cached.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Backend`] if the fetch fails, or
    /// [`QueryError::BackingOff`] if an earlier failure's retry delay has not
    /// yet elapsed.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, QueryError>
    where
        T: Cached,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        self.load(key, false, fetcher).await
    }

    /// Fetch `key` from the backend even if a fresh value is cached.
    ///
    /// Used by polling. Ignores any retry delay.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Backend`] if the fetch fails.
    pub async fn refetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> Result<T, QueryError>
    where
        T: Cached,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        self.load(key, true, fetcher).await
    }

    async fn load<T, F, Fut>(&self, key: QueryKey, force: bool, fetcher: F) -> Result<T, QueryError>
    where
        T: Cached,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let entry = self.entry(&key).await;

        let (generation, had_value) = {
            let mut slot = entry.slot.lock().await;

            if !force {
                if slot.state == EntryState::Ready
                    && !slot.stale
                    && let Some(value) = slot.value.as_ref().and_then(T::from_value)
                {
                    debug!(%key, "Cache hit");
                    return Ok(value);
                }

                if let (Some(retry_at), Some(source)) = (slot.retry_at, &slot.last_error) {
                    let now = Instant::now();
                    if now < retry_at {
                        return Err(QueryError::BackingOff {
                            key,
                            retry_in: retry_at - now,
                            source: Arc::clone(source),
                        });
                    }
                }
            }

            debug!(%key, force, "Cache miss, fetching");
            let had_value = slot.state == EntryState::Ready;
            slot.state = EntryState::Fetching;
            slot.in_flight += 1;
            (slot.generation, had_value)
        };

        let result = fetcher().await;

        let mut slot = entry.slot.lock().await;
        slot.in_flight = slot.in_flight.saturating_sub(1);

        match result {
            Ok(value) => {
                slot.value = Some(value.clone().into_value());
                slot.state = EntryState::Ready;
                slot.stale = slot.generation != generation;
                slot.failures = 0;
                slot.retry_at = None;
                slot.last_error = None;
                Ok(value)
            }
            // A failed forced refresh keeps the value already served
            Err(e) if force && had_value => {
                warn!(%key, error = %e, "Refetch failed, keeping cached value");
                slot.state = EntryState::Ready;
                Err(QueryError::Backend {
                    key,
                    source: Arc::new(e),
                })
            }
            Err(e) => {
                slot.failures = slot.failures.saturating_add(1);
                let delay = self.inner.retry.delay(slot.failures);
                warn!(
                    %key,
                    error = %e,
                    failures = slot.failures,
                    retry_in_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Fetch failed"
                );
                let source = Arc::new(e);
                slot.state = EntryState::Failed;
                slot.retry_at = Some(Instant::now() + delay);
                slot.last_error = Some(Arc::clone(&source));
                Err(QueryError::Backend { key, source })
            }
        }
    }

    /// The last value stored for `key`, fresh or not.
    pub async fn peek<T: Cached>(&self, key: &QueryKey) -> Option<T> {
        let entry = self.inner.entries.get(key).await?;
        let slot = entry.slot.lock().await;
        slot.value.as_ref().and_then(T::from_value)
    }

    /// State of the entry for `key`, if one exists.
    pub async fn snapshot(&self, key: &QueryKey) -> Option<EntrySnapshot> {
        let entry = self.inner.entries.get(key).await?;
        let slot = entry.slot.lock().await;
        Some(EntrySnapshot {
            state: slot.state,
            stale: slot.stale,
            in_flight: slot.in_flight,
            failures: slot.failures,
        })
    }

    /// Mark every entry covered by `key` stale. Returns how many were marked.
    pub async fn invalidate(&self, key: &QueryKey) -> usize {
        let matching: Vec<Arc<Entry>> = self
            .inner
            .entries
            .iter()
            .filter(|(cached, _)| key.covers(cached))
            .map(|(_, entry)| entry)
            .collect();

        for entry in &matching {
            let mut slot = entry.slot.lock().await;
            slot.stale = true;
            slot.generation = slot.generation.wrapping_add(1);
            slot.retry_at = None;
        }

        debug!(%key, count = matching.len(), "Invalidated");
        matching.len()
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.inner.entries.invalidate_all();
        self.inner.entries.run_pending_tasks().await;
    }
}
