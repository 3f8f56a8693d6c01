//! Core abstractions for depimpact.
//!
//! This crate provides the registry-facing engine shared by every
//! ecosystem-specific crate.
//!
//! # Architecture
//!
//! depimpact-core defines:
//! - **Traits**: `PackageSource` (one registry request) and `Sleeper` (backoff waits)
//! - **Registry client**: `RegistryClient` with a case-insensitive cache,
//!   single-flight lookups, a concurrency ceiling and exponential-backoff retries
//! - **Domain types**: declarations, registry records and version comparisons
//! - **Error types**: per-package `FetchError` and the crate-wide `ImpactError`
//!
//! # Examples
//!
//! Plugging a registry into the client:
//!
//! ```no_run
//! use async_trait::async_trait;
//! use depimpact_core::{FetchError, PackageSource, RegistryClient, RegistryConfig, RegistryRecord};
//! use std::sync::Arc;
//!
//! struct MyRegistry;
//!
//! #[async_trait]
//! impl PackageSource for MyRegistry {
//!     async fn fetch_package(&self, name: &str) -> Result<RegistryRecord, FetchError> {
//!         Err(FetchError::not_found(name))
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> depimpact_core::Result<()> {
//! let client = RegistryClient::new(Arc::new(MyRegistry), &RegistryConfig::default())?;
//! let batch = client.fetch_batch(["left-pad"]).await;
//! assert_eq!(batch.failed, 1);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod registry;
pub mod retry;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheStats, RecordCache};
pub use client::{BatchOutcome, RegistryClient};
pub use config::{BatchMode, DEFAULT_REGISTRY_URL, RegistryConfig};
pub use error::{FetchError, FetchErrorKind, ImpactError, Result};
pub use registry::{PackageSource, Sleeper, TokioSleeper};
pub use retry::RetryPolicy;
pub use types::{
    DependencyDeclaration, DependencyKind, DiffKind, ImpactLevel, RegistryRecord, SecurityRisk,
    VersionComparison, VersionStatus,
};
