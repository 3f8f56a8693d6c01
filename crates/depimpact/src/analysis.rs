//! Manifest analysis: registry lookups, version comparison and ranking.

use crate::summary::{AnalysisSummary, PerformanceSnapshot};
use chrono::{DateTime, Utc};
use depimpact_core::{
    CacheStats, DependencyDeclaration, DependencyKind, DiffKind, FetchError, ImpactLevel,
    RegistryClient, RegistryConfig, RegistryRecord, Result, SecurityRisk, VersionComparison,
    VersionStatus,
};
use depimpact_npm::{NpmSource, collect_declarations, compare, declared_baseline};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Terminal state of one dependency in an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyStatus {
    UpToDate,
    Outdated,
    Ahead,
    Unknown,
    /// The registry lookup failed; see [`AnalysisResult::error`].
    Error,
}

impl From<VersionStatus> for DependencyStatus {
    fn from(status: VersionStatus) -> Self {
        match status {
            VersionStatus::UpToDate => Self::UpToDate,
            VersionStatus::Outdated => Self::Outdated,
            VersionStatus::Ahead => Self::Ahead,
            VersionStatus::Unknown => Self::Unknown,
        }
    }
}

/// Analysis of a single declared dependency.
///
/// Registry fields are `None` when the lookup failed; `error` then carries the
/// failure message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub name: String,
    pub kind: DependencyKind,
    pub declared_range: Option<String>,
    /// Declared range without its leading operator.
    pub current_version: Option<String>,
    pub latest_version: Option<String>,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub homepage: Option<String>,
    pub license: Option<String>,
    pub deprecated: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub status: DependencyStatus,
    pub diff_kind: DiffKind,
    pub impact: ImpactLevel,
    pub security_risk: SecurityRisk,
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn classified(
        decl: &DependencyDeclaration,
        record: &RegistryRecord,
        comparison: VersionComparison,
    ) -> Self {
        Self {
            name: decl.name.clone(),
            kind: decl.kind,
            declared_range: decl.declared_range.clone(),
            current_version: current_version(decl),
            latest_version: record.latest_version.clone(),
            description: record.description.clone(),
            repository_url: record.repository_url.clone(),
            homepage: record.homepage.clone(),
            license: record.license.clone(),
            deprecated: record.deprecated.clone(),
            published_at: record.published_at,
            status: comparison.status.into(),
            diff_kind: comparison.diff_kind,
            impact: comparison.impact,
            security_risk: security_risk(record, &comparison),
            error: None,
        }
    }

    pub fn errored(decl: &DependencyDeclaration, error: &FetchError) -> Self {
        Self {
            name: decl.name.clone(),
            kind: decl.kind,
            declared_range: decl.declared_range.clone(),
            current_version: current_version(decl),
            latest_version: None,
            description: None,
            repository_url: None,
            homepage: None,
            license: None,
            deprecated: None,
            published_at: None,
            status: DependencyStatus::Error,
            diff_kind: DiffKind::None,
            impact: ImpactLevel::Unknown,
            security_risk: SecurityRisk::Unknown,
            error: Some(error.to_string()),
        }
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.status, DependencyStatus::Error)
    }
}

fn current_version(decl: &DependencyDeclaration) -> Option<String> {
    decl.declared_range
        .as_deref()
        .map(|range| declared_baseline(range).to_string())
}

/// Deprecation dominates; an outdated major version is a medium risk.
pub fn security_risk(record: &RegistryRecord, comparison: &VersionComparison) -> SecurityRisk {
    if record.is_deprecated() {
        SecurityRisk::High
    } else if comparison.status == VersionStatus::Outdated
        && comparison.diff_kind == DiffKind::Major
    {
        SecurityRisk::Medium
    } else {
        SecurityRisk::Low
    }
}

/// Orders results by impact, most severe first, then by name.
pub fn sort_results(results: &mut [AnalysisResult]) {
    results.sort_by(|a, b| {
        b.impact
            .rank()
            .cmp(&a.impact.rank())
            .then_with(|| a.name.cmp(&b.name))
    });
}

/// Ranked results and their summary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub results: Vec<AnalysisResult>,
    pub summary: AnalysisSummary,
    pub cache_stats: CacheStats,
}

impl AnalysisReport {
    pub fn errors(&self) -> impl Iterator<Item = &AnalysisResult> {
        self.results.iter().filter(|r| r.is_error())
    }
}

/// Turns a package.json value into a ranked, classified report.
///
/// The service holds no state of its own; registry records are cached by the
/// wrapped [`RegistryClient`] and shared between runs until
/// [`clear_cache`](Self::clear_cache) is called.
///
/// # Examples
///
/// ```no_run
/// use depimpact::AnalysisService;
/// use depimpact_core::RegistryConfig;
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() -> depimpact_core::Result<()> {
/// let service = AnalysisService::from_config(&RegistryConfig::default())?;
/// let report = service
///     .analyze(&json!({ "dependencies": { "react": "^16.0.0" } }))
///     .await?;
/// println!("{} outdated", report.summary.outdated);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AnalysisService {
    client: RegistryClient,
}

impl AnalysisService {
    pub fn new(client: RegistryClient) -> Self {
        Self { client }
    }

    /// Service backed by the npm registry described in `config`.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let source = NpmSource::new(config)?;
        Ok(Self::new(RegistryClient::new(Arc::new(source), config)?))
    }

    pub fn client(&self) -> &RegistryClient {
        &self.client
    }

    /// Analyzes the `dependencies` and `devDependencies` of `manifest`.
    ///
    /// Registry failures never fail the call: they become `Error` results.
    ///
    /// # Errors
    ///
    /// Returns `ImpactError::InvalidInput` if `manifest` is not a JSON object.
    pub async fn analyze(&self, manifest: &Value) -> Result<AnalysisReport> {
        let declarations = collect_declarations(manifest)?;
        if declarations.is_empty() {
            tracing::info!("manifest declares no dependencies");
            return Ok(AnalysisReport {
                results: Vec::new(),
                summary: AnalysisSummary::empty(),
                cache_stats: self.client.cache_stats(),
            });
        }

        let batch = self
            .client
            .fetch_batch(declarations.iter().map(|decl| decl.name.as_str()))
            .await;

        let mut results: Vec<AnalysisResult> = declarations
            .iter()
            .map(|decl| match batch.records.get(&decl.name) {
                Some(record) => {
                    let comparison =
                        compare(decl.declared_range.as_deref(), record.latest_version.as_deref());
                    AnalysisResult::classified(decl, record, comparison)
                }
                None => {
                    let error = batch.errors.get(&decl.name).cloned().unwrap_or_else(|| {
                        FetchError::transport(decl.name.as_str(), "no registry outcome recorded")
                    });
                    AnalysisResult::errored(decl, &error)
                }
            })
            .collect();
        sort_results(&mut results);

        let cache_stats = self.client.cache_stats();
        let summary =
            AnalysisSummary::from_results(&results, PerformanceSnapshot::new(&batch, &cache_stats));

        tracing::info!(
            "analyzed {} dependencies: {} outdated, {} errors",
            summary.total,
            summary.outdated,
            summary.errors
        );

        Ok(AnalysisReport {
            results,
            summary,
            cache_stats,
        })
    }

    /// Forgets cached registry records and errors.
    pub fn clear_cache(&self) {
        self.client.clear_cache();
    }
}
