use crate::error::FetchError;
use crate::types::RegistryRecord;
use async_trait::async_trait;
use std::time::Duration;

/// A single-shot lookup against a package registry.
///
/// Implementors perform exactly one network request per call and map the
/// outcome onto [`FetchError`]. Caching, de-duplication, concurrency limits
/// and retries are layered on top by `RegistryClient`.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use depimpact_core::{FetchError, PackageSource, RegistryRecord};
///
/// struct Fixed;
///
/// #[async_trait]
/// impl PackageSource for Fixed {
///     async fn fetch_package(&self, name: &str) -> Result<RegistryRecord, FetchError> {
///         Ok(RegistryRecord::with_latest(name, "1.0.0"))
///     }
/// }
/// ```
#[async_trait]
pub trait PackageSource: Send + Sync {
    /// Fetches and extracts metadata for `name`.
    ///
    /// # Errors
    ///
    /// - `NotFound` when the registry has no such package
    /// - `RateLimited` when the registry throttles the request
    /// - `Timeout` when the request exceeds the configured deadline
    /// - `Transport` for anything else, including malformed documents
    async fn fetch_package(&self, name: &str) -> Result<RegistryRecord, FetchError>;
}

/// Suspension point used between retry attempts.
///
/// Injected into the client; tests record the requested delays instead of
/// waiting on real timers.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
