//! npm registry transport.
//!
//! Performs one package metadata request
//! (<https://registry.npmjs.org/{package}>) per call and extracts the fields
//! the analysis stage needs. Caching, single-flight and retries are handled
//! by [`depimpact_core::RegistryClient`].

use crate::error::{NpmError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use depimpact_core::{FetchError, ImpactError, PackageSource, RegistryConfig, RegistryRecord};
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// HTTP transport for an npm-compatible registry.
///
/// # Examples
///
/// ```no_run
/// # use depimpact_npm::NpmSource;
/// # use depimpact_core::{PackageSource, RegistryConfig};
/// # #[tokio::main]
/// # async fn main() {
/// let source = NpmSource::new(&RegistryConfig::default()).unwrap();
/// let record = source.fetch_package("express").await.unwrap();
/// assert!(record.latest_version.is_some());
/// # }
/// ```
#[derive(Clone)]
pub struct NpmSource {
    client: Client,
    base_url: String,
}

impl NpmSource {
    /// Creates a transport using the registry URL, timeout and user agent
    /// from `config`.
    ///
    /// # Errors
    ///
    /// Returns `ImpactError::InvalidConfig` if the HTTP client cannot be built.
    pub fn new(config: &RegistryConfig) -> depimpact_core::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| ImpactError::InvalidConfig(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.registry_url.trim_end_matches('/').to_string(),
        })
    }

    /// Metadata endpoint for `name`; scoped names are escaped as a single
    /// path segment (`@scope/pkg` -> `%40scope%2Fpkg`).
    pub fn package_endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, urlencoding::encode(name))
    }
}

#[async_trait]
impl PackageSource for NpmSource {
    async fn fetch_package(&self, name: &str) -> std::result::Result<RegistryRecord, FetchError> {
        let url = self.package_endpoint(name);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| request_error(name, &e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::not_found(name));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::rate_limited(name));
        }
        if !status.is_success() {
            tracing::warn!("npm registry returned status {}: {}", status, url);
            return Err(FetchError::transport(
                name,
                format!("unexpected response status: {status}"),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| request_error(name, &e))?;

        parse_package_document(name, &body).map_err(|e| {
            tracing::warn!("{}", e);
            FetchError::transport(name, e.to_string())
        })
    }
}

fn request_error(name: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::timeout(name)
    } else {
        FetchError::transport(name, err.to_string())
    }
}

/// Package document returned by the npm registry.
#[derive(Deserialize)]
struct PackageDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(rename = "dist-tags", default)]
    dist_tags: HashMap<String, Value>,
    #[serde(default)]
    versions: HashMap<String, VersionDocument>,
    #[serde(default)]
    time: HashMap<String, Value>,
    #[serde(default)]
    repository: Option<Value>,
    #[serde(default)]
    homepage: Option<Value>,
    #[serde(default)]
    license: Option<Value>,
    #[serde(default)]
    deprecated: Option<Value>,
}

/// Per-version manifest inside the package document.
#[derive(Deserialize)]
struct VersionDocument {
    #[serde(default)]
    deprecated: Option<Value>,
}

/// Extracts a [`RegistryRecord`] from a raw npm package document.
///
/// The deprecation message comes from the top-level `deprecated` field,
/// falling back to the one on the latest version.
///
/// # Errors
///
/// Returns `NpmError::ApiResponseError` if the body is not a package document.
pub fn parse_package_document(name: &str, data: &[u8]) -> Result<RegistryRecord> {
    let doc: PackageDocument =
        serde_json::from_slice(data).map_err(|e| NpmError::api_response_error(name, e))?;

    let latest_version = doc.dist_tags.get("latest").and_then(non_empty_str);

    let latest_manifest = latest_version
        .as_deref()
        .and_then(|latest| doc.versions.get(latest));
    let deprecated = deprecation_message(doc.deprecated.as_ref()).or_else(|| {
        latest_manifest.and_then(|manifest| deprecation_message(manifest.deprecated.as_ref()))
    });

    let published_at = latest_version
        .as_deref()
        .and_then(|latest| doc.time.get(latest))
        .and_then(Value::as_str)
        .and_then(parse_timestamp);

    Ok(RegistryRecord {
        name: doc.name.unwrap_or_else(|| name.to_string()),
        latest_version,
        description: doc.description.as_ref().and_then(non_empty_str),
        repository_url: doc.repository.as_ref().and_then(|repo| field_or_self(repo, "url")),
        homepage: doc.homepage.as_ref().and_then(non_empty_str),
        license: doc.license.as_ref().and_then(|license| field_or_self(license, "type")),
        deprecated,
        published_at,
        version_count: doc.versions.len(),
    })
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Reads fields that npm allows either as a plain string or as an object
/// (`"repository": {"type": "git", "url": "..."}`, `"license": {"type": "MIT"}`).
fn field_or_self(value: &Value, field: &str) -> Option<String> {
    match value {
        Value::Object(map) => map.get(field).and_then(non_empty_str),
        other => non_empty_str(other),
    }
}

fn deprecation_message(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Bool(true) => Some("This package is deprecated".to_string()),
        other => non_empty_str(other),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
