//! Concurrent registry client.
//!
//! Wraps a [`PackageSource`] with:
//! - a case-insensitive cache of records and terminal errors
//! - single-flight de-duplication of concurrent lookups for the same key
//! - a client-wide semaphore bounding in-flight network requests
//! - a per-request timeout and exponential-backoff retries
//!
//! Every lookup runs on its own tokio task, so a caller that stops awaiting
//! never strands the other callers attached to the same key.

use crate::cache::{CacheStats, FetchOutcome, Lookup, RecordCache, SharedFetch};
use crate::config::{BatchMode, RegistryConfig};
use crate::error::{FetchError, Result};
use crate::registry::{PackageSource, Sleeper, TokioSleeper};
use crate::retry::RetryPolicy;
use crate::types::RegistryRecord;
use futures::FutureExt;
use futures::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Result of [`RegistryClient::fetch_batch`].
///
/// Keys are the package names exactly as requested. Every unique name ends
/// up in exactly one of `records` or `errors`.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub records: HashMap<String, Arc<RegistryRecord>>,
    pub errors: HashMap<String, FetchError>,
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchOutcome {
    fn absorb(&mut self, results: Vec<(String, FetchOutcome)>) {
        for (name, outcome) in results {
            match outcome {
                Ok(record) => {
                    self.succeeded += 1;
                    self.records.insert(name, record);
                }
                Err(err) => {
                    self.failed += 1;
                    self.errors.insert(name, err);
                }
            }
        }
    }
}

struct ClientInner {
    source: Arc<dyn PackageSource>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
    timeout: Duration,
    batch_mode: BatchMode,
    max_concurrent: usize,
    permits: Semaphore,
    cache: RecordCache,
    network_requests: AtomicUsize,
}

/// Registry client with caching, single-flight lookups, bounded concurrency
/// and retries.
///
/// Cloning is cheap and clones share the same cache.
///
/// # Examples
///
/// ```no_run
/// use async_trait::async_trait;
/// use depimpact_core::{FetchError, PackageSource, RegistryClient, RegistryConfig, RegistryRecord};
/// use std::sync::Arc;
///
/// struct Fixed;
///
/// #[async_trait]
/// impl PackageSource for Fixed {
///     async fn fetch_package(&self, name: &str) -> Result<RegistryRecord, FetchError> {
///         Ok(RegistryRecord::with_latest(name, "1.0.0"))
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> depimpact_core::Result<()> {
/// let client = RegistryClient::new(Arc::new(Fixed), &RegistryConfig::default())?;
/// let batch = client.fetch_batch(["react", "lodash", "react"]).await;
/// assert_eq!(batch.requested, 2);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RegistryClient {
    inner: Arc<ClientInner>,
}

impl RegistryClient {
    /// Creates a client that backs off on the tokio timer.
    ///
    /// # Errors
    ///
    /// Returns `ImpactError::InvalidConfig` if the configuration is invalid.
    pub fn new(source: Arc<dyn PackageSource>, config: &RegistryConfig) -> Result<Self> {
        Self::with_sleeper(source, Arc::new(TokioSleeper), config)
    }

    /// Creates a client with a custom backoff sleeper.
    pub fn with_sleeper(
        source: Arc<dyn PackageSource>,
        sleeper: Arc<dyn Sleeper>,
        config: &RegistryConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                source,
                sleeper,
                retry: RetryPolicy::from_config(config),
                timeout: config.timeout(),
                batch_mode: config.batch_mode,
                max_concurrent: config.max_concurrent,
                permits: Semaphore::new(config.max_concurrent),
                cache: RecordCache::new(),
                network_requests: AtomicUsize::new(0),
            }),
        })
    }

    /// Resolves one package name to its registry record.
    ///
    /// Cached records and cached errors are returned without touching the
    /// network. A lookup already in flight for the same key is joined
    /// instead of duplicated.
    ///
    /// # Errors
    ///
    /// Returns the terminal [`FetchError`] once all retry attempts failed.
    pub async fn fetch_one(&self, name: &str) -> FetchOutcome {
        if name.trim().is_empty() {
            return Err(FetchError::transport(
                name,
                "package name must be a non-empty string",
            ));
        }

        let key = RecordCache::key(name);
        match self
            .inner
            .cache
            .lookup_or_start(&key, || self.start_fetch(name, &key))
        {
            Lookup::Hit(outcome) => {
                tracing::debug!(package = name, "registry cache hit");
                outcome
            }
            Lookup::Join(fetch) => {
                tracing::debug!(package = name, "joining in-flight registry request");
                fetch.await
            }
            Lookup::Started(fetch) => fetch.await,
        }
    }

    /// Fetches every unique name, isolating failures per package.
    ///
    /// Input names are de-duplicated exactly as given; names differing only
    /// in case still share one network request through the cache.
    pub async fn fetch_batch<I, S>(&self, names: I) -> BatchOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        let mut outcome = BatchOutcome {
            requested: unique.len(),
            ..BatchOutcome::default()
        };
        if unique.is_empty() {
            return outcome;
        }

        let names: Vec<String> = unique.into_iter().collect();
        tracing::info!(
            "fetching registry data for {} packages ({:?}, max {} concurrent)",
            names.len(),
            self.inner.batch_mode,
            self.inner.max_concurrent
        );

        match self.inner.batch_mode {
            BatchMode::Continuous => {
                outcome.absorb(self.fetch_all(&names).await);
            }
            BatchMode::Chunked => {
                for chunk in names.chunks(self.inner.max_concurrent) {
                    tracing::debug!("fetching chunk of {} packages", chunk.len());
                    outcome.absorb(self.fetch_all(chunk).await);
                }
            }
        }

        tracing::info!(
            "registry batch finished: {}/{} succeeded",
            outcome.succeeded,
            outcome.requested
        );
        outcome
    }

    /// Drops cached records and errors; in-flight lookups are left alone.
    pub fn clear_cache(&self) {
        self.inner.cache.clear_settled();
    }

    pub fn cache_stats(&self) -> CacheStats {
        let (cache_size, pending_count) = self.inner.cache.counts();
        CacheStats {
            cache_size,
            pending_count,
            network_requests: self.inner.network_requests.load(Ordering::Relaxed),
        }
    }

    async fn fetch_all(&self, names: &[String]) -> Vec<(String, FetchOutcome)> {
        join_all(names.iter().map(|name| async move {
            let outcome = self.fetch_one(name).await;
            (name.clone(), outcome)
        }))
        .await
    }

    /// Spawns the retry chain for `name` and wraps it for sharing.
    ///
    /// Called with the cache shard locked; it only spawns and never awaits.
    fn start_fetch(&self, name: &str, key: &str) -> SharedFetch {
        let inner = Arc::clone(&self.inner);
        let package = name.to_string();
        let key = key.to_string();

        let task = tokio::spawn(async move {
            let outcome = inner.fetch_with_retry(&package).await.map(Arc::new);
            inner.cache.settle(&key, &outcome);
            outcome
        });

        let package = name.to_string();
        async move {
            task.await.unwrap_or_else(|e| {
                Err(FetchError::transport(
                    package,
                    format!("registry task failed: {e}"),
                ))
            })
        }
        .boxed()
        .shared()
    }
}

impl ClientInner {
    async fn fetch_with_retry(&self, name: &str) -> std::result::Result<RegistryRecord, FetchError> {
        let mut attempt = 1;
        loop {
            let result = self.attempt(name, attempt).await;
            let err = match result {
                Ok(record) => return Ok(record),
                Err(err) => err,
            };

            match self.retry.backoff_after(attempt) {
                Some(delay) => {
                    tracing::warn!(
                        "attempt {}/{} for {} failed ({}), retrying in {:?}",
                        attempt,
                        self.retry.attempts(),
                        name,
                        err,
                        delay
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                None => {
                    tracing::warn!("giving up on {} after {} attempts: {}", name, attempt, err);
                    return Err(err);
                }
            }
        }
    }

    /// One network request, holding a concurrency permit for its duration.
    async fn attempt(
        &self,
        name: &str,
        attempt: u32,
    ) -> std::result::Result<RegistryRecord, FetchError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchError::transport(name, "registry client is shut down"))?;

        self.network_requests.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(package = name, attempt, "requesting registry metadata");

        match tokio::time::timeout(self.timeout, self.source.fetch_package(name)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::timeout(name)),
        }
    }
}
