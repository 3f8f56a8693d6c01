use crate::error::FetchError;
use crate::types::RegistryRecord;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use std::sync::Arc;

/// Final outcome of one package lookup, shared by every caller that asked for it.
pub type FetchOutcome = Result<Arc<RegistryRecord>, FetchError>;

/// An in-flight lookup that any number of callers can await.
pub type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

/// State of a single cache key.
///
/// Resolved records, terminal errors and in-flight work live in one map so
/// that "is anything cached or pending for this key?" and "mark it pending"
/// happen under the same shard lock.
#[derive(Clone)]
enum CacheState {
    Pending(SharedFetch),
    Resolved(Arc<RegistryRecord>),
    Failed(FetchError),
}

/// What a caller should do after consulting the cache.
pub enum Lookup {
    /// A resolved record or terminal error was already cached.
    Hit(FetchOutcome),
    /// Another caller started this lookup; await its result.
    Join(SharedFetch),
    /// This caller registered a new lookup and owns starting it.
    Started(SharedFetch),
}

/// Snapshot of the client's cache occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Keys holding a resolved record or a terminal error.
    pub cache_size: usize,
    /// Keys with a lookup still in flight.
    pub pending_count: usize,
    /// Network attempts issued over the client's lifetime, retries included.
    pub network_requests: usize,
}

/// Per-key cache of registry lookups with single-flight semantics.
///
/// Keys are case-insensitive package names. Negative results are cached for
/// the lifetime of the cache just like records, so a missing package is only
/// looked up once per run.
///
/// # Examples
///
/// ```
/// use depimpact_core::cache::RecordCache;
///
/// assert_eq!(RecordCache::key("React"), "react");
/// let cache = RecordCache::new();
/// assert!(cache.is_empty());
/// ```
#[derive(Default)]
pub struct RecordCache {
    entries: DashMap<String, CacheState>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes a package name into its cache key.
    ///
    /// Only case is folded; whitespace is kept so the key matches the name
    /// sent to the registry.
    pub fn key(name: &str) -> String {
        name.to_lowercase()
    }

    /// Returns the cached outcome or in-flight lookup for `key`, or registers
    /// the lookup produced by `start`.
    ///
    /// `start` runs while the key's shard is locked, so two concurrent
    /// callers can never both observe an empty slot. It must not block or
    /// touch this cache.
    pub fn lookup_or_start(&self, key: &str, start: impl FnOnce() -> SharedFetch) -> Lookup {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => match entry.get() {
                CacheState::Resolved(record) => Lookup::Hit(Ok(Arc::clone(record))),
                CacheState::Failed(err) => Lookup::Hit(Err(err.clone())),
                CacheState::Pending(fetch) => Lookup::Join(fetch.clone()),
            },
            Entry::Vacant(entry) => {
                let fetch = start();
                entry.insert(CacheState::Pending(fetch.clone()));
                Lookup::Started(fetch)
            }
        }
    }

    /// Replaces the pending entry for `key` with its final outcome.
    pub fn settle(&self, key: &str, outcome: &FetchOutcome) {
        let state = match outcome {
            Ok(record) => CacheState::Resolved(Arc::clone(record)),
            Err(err) => CacheState::Failed(err.clone()),
        };
        self.entries.insert(key.to_string(), state);
    }

    /// Drops resolved records and cached errors; in-flight lookups are kept.
    pub fn clear_settled(&self) {
        self.entries
            .retain(|_, state| matches!(state, CacheState::Pending(_)));
    }

    /// Number of settled entries and number of pending entries.
    pub fn counts(&self) -> (usize, usize) {
        self.entries
            .iter()
            .fold((0, 0), |(settled, pending), entry| match entry.value() {
                CacheState::Pending(_) => (settled, pending + 1),
                CacheState::Resolved(_) | CacheState::Failed(_) => (settled + 1, pending),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
