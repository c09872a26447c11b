//! TTL-bounded per-resource caches with fetch coalescing.
//!
//! One cache instance per resource kind, keyed by an optional resource
//! identifier (`None` for singleton resources such as the dashboard). A
//! valid entry is returned without a network call; a stale or missing entry
//! triggers a fetch through the transport client, and concurrent callers for
//! the same key coalesce onto one shared in-flight future, so at most one
//! network call runs per key at a time. Callers that join an in-flight fetch
//! observe that fetch's result.
//!
//! A cache miss is not an error; it is the normal trigger for a fetch.
//! Fetches are never retried here and never cancelled once started.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::Result;
use crate::storage::KvStore;

/// Default TTL for frequently-changing aggregate data.
pub const AGGREGATE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Default TTL for rarely-changing reference data.
pub const REFERENCE_TTL: Duration = Duration::from_secs(3600); // 1 hour

/// Cache key: `None` for singleton resources, `Some(id)` for
/// collection-item resources.
type CacheKey = Option<String>;

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T>>>;

struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
    /// Wall-clock twin of `fetched_at`, used only for persistence.
    fetched_at_wall: DateTime<Utc>,
}

/// Wire shape for entries persisted through the key/value store.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedEntry<T> {
    key: CacheKey,
    value: T,
    fetched_at: DateTime<Utc>,
}

struct CacheState<T> {
    name: &'static str,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry<T>>>,
    /// In-flight registry: at most one outstanding fetch per key, tagged
    /// with the generation it started in.
    inflight: Mutex<HashMap<CacheKey, (u64, SharedFetch<T>)>>,
    /// Per-key generation, bumped by invalidation. A fetch started in an
    /// older generation cannot store its result or clear a newer
    /// registration, so a mutation's invalidation wins over any fetch
    /// already in flight.
    generations: Mutex<HashMap<CacheKey, u64>>,
    storage: Option<(Arc<dyn KvStore>, String)>,
}

/// TTL-bounded cache for one resource kind.
pub struct ResourceCache<T> {
    state: Arc<CacheState<T>>,
}

impl<T> Clone for ResourceCache<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> std::fmt::Debug for ResourceCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("name", &self.state.name)
            .field("ttl", &self.state.ttl)
            .finish()
    }
}

impl<T> ResourceCache<T>
where
    T: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    /// Create an in-memory cache.
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self {
            state: Arc::new(CacheState {
                name,
                ttl,
                entries: Mutex::new(HashMap::new()),
                inflight: Mutex::new(HashMap::new()),
                generations: Mutex::new(HashMap::new()),
                storage: None,
            }),
        }
    }

    /// Create a cache that persists its entries through the key/value store
    /// under `storage_key`, warming itself from any entries still inside
    /// their TTL.
    #[must_use]
    pub fn with_storage(
        name: &'static str,
        ttl: Duration,
        kv: Arc<dyn KvStore>,
        storage_key: impl Into<String>,
    ) -> Self {
        let storage_key = storage_key.into();
        let mut entries = HashMap::new();
        if let Some(raw) = kv.get(&storage_key)
            && let Ok(persisted) = serde_json::from_value::<Vec<PersistedEntry<T>>>(raw)
        {
            let now = Instant::now();
            for entry in persisted {
                let age = (Utc::now() - entry.fetched_at).to_std().unwrap_or_default();
                if age < ttl
                    && let Some(fetched_at) = now.checked_sub(age)
                {
                    entries.insert(
                        entry.key,
                        CacheEntry {
                            value: entry.value,
                            fetched_at,
                            fetched_at_wall: entry.fetched_at,
                        },
                    );
                }
            }
            if !entries.is_empty() {
                tracing::debug!(cache = name, entries = entries.len(), "warmed from storage");
            }
        }
        Self {
            state: Arc::new(CacheState {
                name,
                ttl,
                entries: Mutex::new(entries),
                inflight: Mutex::new(HashMap::new()),
                generations: Mutex::new(HashMap::new()),
                storage: Some((kv, storage_key)),
            }),
        }
    }

    /// Cache name, for logging and diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.state.name
    }

    /// Get the cached value for `key`, fetching if stale, missing, or
    /// forced.
    ///
    /// `fetch` is consumed only when a network call is actually needed;
    /// concurrent callers for the same key share one in-flight fetch and
    /// all observe its outcome.
    ///
    /// # Errors
    ///
    /// Propagates the fetch error to every coalesced caller.
    pub async fn get_with<F>(&self, key: Option<&str>, force_refresh: bool, fetch: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let cache_key: CacheKey = key.map(str::to_owned);

        if !force_refresh
            && let Some(value) = self.state.lookup(&cache_key)
        {
            tracing::debug!(cache = self.state.name, ?key, "cache hit");
            return Ok(value);
        }

        let shared = {
            let mut inflight = self
                .state
                .inflight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some((_, existing)) = inflight.get(&cache_key) {
                tracing::debug!(cache = self.state.name, ?key, "joining in-flight fetch");
                existing.clone()
            } else {
                tracing::debug!(cache = self.state.name, ?key, force_refresh, "fetching");
                let state = Arc::clone(&self.state);
                let fetch_key = cache_key.clone();
                let generation = self.state.generation(&cache_key);
                let fut: SharedFetch<T> = async move {
                    let result = fetch.await;
                    if let Ok(value) = &result {
                        state.store(fetch_key.clone(), value.clone(), generation);
                    }
                    // Clear our own registration before any waiter resumes.
                    // An invalidation may already have replaced it with a
                    // newer fetch, which must be left alone.
                    let mut inflight = state
                        .inflight
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    if inflight
                        .get(&fetch_key)
                        .is_some_and(|(g, _)| *g == generation)
                    {
                        inflight.remove(&fetch_key);
                    }
                    result
                }
                .boxed()
                .shared();
                inflight.insert(cache_key, (generation, fut.clone()));
                fut
            }
        };
        shared.await
    }

    /// Drop the entry for `key` without fetching; the next `get` fetches.
    ///
    /// Any fetch in flight for `key` is superseded: it still resolves for
    /// the callers already awaiting it, but its result is discarded rather
    /// than stored, and a `get` issued after this call starts a fresh fetch
    /// instead of joining it.
    pub fn invalidate(&self, key: Option<&str>) {
        let cache_key: CacheKey = key.map(str::to_owned);
        let dropped_fetch = self
            .state
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&cache_key)
            .is_some();
        let removed = {
            let mut generations = self
                .state
                .generations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let mut entries = self
                .state
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if dropped_fetch || entries.contains_key(&cache_key) {
                *generations.entry(cache_key.clone()).or_insert(0) += 1;
            }
            entries.remove(&cache_key).is_some()
        };
        if removed || dropped_fetch {
            tracing::debug!(cache = self.state.name, ?key, "invalidated");
        }
        if removed {
            self.state.persist();
        }
    }

    /// Drop every entry without fetching, superseding every in-flight
    /// fetch.
    pub fn invalidate_all(&self) {
        let inflight_keys: Vec<CacheKey> = self
            .state
            .inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .map(|(key, _)| key)
            .collect();
        let had_entries = {
            let mut generations = self
                .state
                .generations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let mut entries = self
                .state
                .entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for key in entries.keys().cloned().chain(inflight_keys) {
                *generations.entry(key).or_insert(0) += 1;
            }
            let had_entries = !entries.is_empty();
            entries.clear();
            had_entries
        };
        if had_entries {
            tracing::debug!(cache = self.state.name, "invalidated all");
            self.state.persist();
        }
    }

    /// Whether a currently valid entry exists for `key`.
    #[must_use]
    pub fn contains_valid(&self, key: Option<&str>) -> bool {
        self.state.lookup(&key.map(str::to_owned)).is_some()
    }
}

impl<T> CacheState<T>
where
    T: Clone + Serialize,
{
    fn lookup(&self, key: &CacheKey) -> Option<T> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    fn generation(&self, key: &CacheKey) -> u64 {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Store a fetch result unless an invalidation superseded the fetch.
    fn store(&self, key: CacheKey, value: T, generation: u64) {
        {
            let generations = self
                .generations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if generations.get(&key).copied().unwrap_or(0) != generation {
                tracing::debug!(
                    cache = self.name,
                    ?key,
                    "fetch superseded by invalidation; discarding result"
                );
                return;
            }
            // Generation lock held through the insert so an invalidation
            // cannot slip between the check and the store.
            self.entries
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(
                    key,
                    CacheEntry {
                        value,
                        fetched_at: Instant::now(),
                        fetched_at_wall: Utc::now(),
                    },
                );
        }
        self.persist();
    }

    fn persist(&self) {
        let Some((kv, storage_key)) = &self.storage else {
            return;
        };
        let persisted: Vec<PersistedEntry<T>> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(key, entry)| PersistedEntry {
                key: key.clone(),
                value: entry.value.clone(),
                fetched_at: entry.fetched_at_wall,
            })
            .collect();
        match serde_json::to_value(&persisted) {
            Ok(raw) => {
                if let Err(e) = kv.set(storage_key, raw) {
                    tracing::warn!(cache = self.name, error = %e, "cache persistence failed");
                }
            }
            Err(e) => tracing::warn!(cache = self.name, error = %e, "cache serialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn miss_fetches_and_stores() {
        let cache: ResourceCache<u32> = ResourceCache::new("test", AGGREGATE_TTL);
        assert_eq!(cache.name(), "test");
        let value = cache
            .get_with(None, false, async { Ok(7) })
            .await
            .expect("fetch");
        assert_eq!(value, 7);
        assert!(cache.contains_valid(None));
    }

    #[tokio::test]
    async fn failed_fetch_stores_nothing() {
        let cache: ResourceCache<u32> = ResourceCache::new("test", AGGREGATE_TTL);
        let err = cache
            .get_with(None, false, async { Err(ApiError::Timeout) })
            .await
            .expect_err("should fail");
        assert_eq!(err, ApiError::Timeout);
        assert!(!cache.contains_valid(None));
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let cache: ResourceCache<u32> = ResourceCache::new("test", AGGREGATE_TTL);
        cache
            .get_with(Some("a"), false, async { Ok(1) })
            .await
            .expect("fetch a");
        cache
            .get_with(Some("b"), false, async { Ok(2) })
            .await
            .expect("fetch b");

        cache.invalidate(Some("a"));
        assert!(!cache.contains_valid(Some("a")));
        assert!(cache.contains_valid(Some("b")));
    }

    #[tokio::test]
    async fn warms_from_storage_within_ttl() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        {
            let cache: ResourceCache<u32> =
                ResourceCache::with_storage("test", AGGREGATE_TTL, Arc::clone(&kv), "cache.test");
            cache
                .get_with(None, false, async { Ok(5) })
                .await
                .expect("fetch");
        }

        let cache: ResourceCache<u32> =
            ResourceCache::with_storage("test", AGGREGATE_TTL, kv, "cache.test");
        assert!(cache.contains_valid(None));
        // A warmed entry serves without touching the fetch future.
        let value = cache
            .get_with(None, false, async { Err(ApiError::Timeout) })
            .await
            .expect("cached");
        assert_eq!(value, 5);
    }
}
