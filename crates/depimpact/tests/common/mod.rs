//! Common test utilities for integration tests.
//!
//! Provides an in-memory `PackageSource` so analysis runs without a network.

use async_trait::async_trait;
use depimpact::AnalysisService;
use depimpact_core::{FetchError, PackageSource, RegistryClient, RegistryConfig, RegistryRecord};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Registry backed by a fixed set of records.
///
/// Names missing from the map answer with `NotFound`.
#[derive(Default)]
pub(crate) struct FakeRegistry {
    records: HashMap<String, RegistryRecord>,
    failures: HashMap<String, FetchError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_package(mut self, name: &str, latest: &str) -> Self {
        self.records
            .insert(name.to_string(), RegistryRecord::with_latest(name, latest));
        self
    }

    pub(crate) fn with_record(mut self, record: RegistryRecord) -> Self {
        self.records.insert(record.name.clone(), record);
        self
    }

    #[allow(dead_code)] // Not every test binary uses failures
    pub(crate) fn with_failure(mut self, name: &str, error: FetchError) -> Self {
        self.failures.insert(name.to_string(), error);
        self
    }

    #[allow(dead_code)] // Used by ordering tests only
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PackageSource for FakeRegistry {
    async fn fetch_package(&self, name: &str) -> Result<RegistryRecord, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failures.get(name) {
            return Err(error.clone());
        }
        self.records
            .get(name)
            .cloned()
            .ok_or_else(|| FetchError::not_found(name))
    }
}

/// Config with a single attempt so failing packages do not wait on backoff.
pub(crate) fn test_config() -> RegistryConfig {
    RegistryConfig {
        retry_attempts: 1,
        retry_base_delay_ms: 1,
        ..RegistryConfig::default()
    }
}

pub(crate) fn service(registry: &Arc<FakeRegistry>) -> AnalysisService {
    let source: Arc<dyn PackageSource> = registry.clone();
    let client = RegistryClient::new(source, &test_config()).expect("valid test config");
    AnalysisService::new(client)
}
