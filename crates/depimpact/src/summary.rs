//! Aggregate counts derived from a list of analysis results.

use crate::analysis::{AnalysisResult, DependencyStatus};
use depimpact_core::{BatchOutcome, CacheStats, ImpactLevel, SecurityRisk};
use serde::Serialize;

/// Per-level counters shared by the impact and security-risk breakdowns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unknown: usize,
}

impl LevelCounts {
    pub const fn total(&self) -> usize {
        self.high + self.medium + self.low + self.unknown
    }

    fn record_impact(&mut self, impact: ImpactLevel) {
        match impact {
            ImpactLevel::High => self.high += 1,
            ImpactLevel::Medium => self.medium += 1,
            ImpactLevel::Low => self.low += 1,
            ImpactLevel::Unknown => self.unknown += 1,
        }
    }

    fn record_risk(&mut self, risk: SecurityRisk) {
        match risk {
            SecurityRisk::High => self.high += 1,
            SecurityRisk::Medium => self.medium += 1,
            SecurityRisk::Low => self.low += 1,
            SecurityRisk::Unknown => self.unknown += 1,
        }
    }
}

/// Registry traffic for one analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSnapshot {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Percentage of requested packages that resolved, rounded.
    pub success_rate: u32,
    pub network_requests: usize,
    pub cache_size: usize,
}

impl PerformanceSnapshot {
    pub fn new(batch: &BatchOutcome, stats: &CacheStats) -> Self {
        Self {
            requested: batch.requested,
            succeeded: batch.succeeded,
            failed: batch.failed,
            success_rate: success_rate(batch.succeeded, batch.requested),
            network_requests: stats.network_requests,
            cache_size: stats.cache_size,
        }
    }
}

/// Rounded `succeeded / requested` percentage; zero when nothing was requested.
///
/// # Examples
///
/// ```
/// use depimpact::summary::success_rate;
///
/// assert_eq!(success_rate(2, 3), 67);
/// assert_eq!(success_rate(0, 0), 0);
/// ```
pub fn success_rate(succeeded: usize, requested: usize) -> u32 {
    if requested == 0 {
        return 0;
    }
    (succeeded as f64 / requested as f64 * 100.0).round() as u32
}

/// Counts by status, impact level and security risk, plus registry traffic.
///
/// Every result lands in exactly one bucket of each breakdown, so
/// `analyzed + errors == total` and each [`LevelCounts`] sums to `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total: usize,
    pub analyzed: usize,
    pub errors: usize,
    pub up_to_date: usize,
    pub outdated: usize,
    pub ahead: usize,
    pub unknown: usize,
    pub impact_levels: LevelCounts,
    pub security_risks: LevelCounts,
    pub performance: PerformanceSnapshot,
}

impl AnalysisSummary {
    /// Summary of a manifest with nothing to analyze.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_results(results: &[AnalysisResult], performance: PerformanceSnapshot) -> Self {
        let mut summary = Self {
            total: results.len(),
            performance,
            ..Self::default()
        };

        for result in results {
            match result.status {
                DependencyStatus::UpToDate => summary.up_to_date += 1,
                DependencyStatus::Outdated => summary.outdated += 1,
                DependencyStatus::Ahead => summary.ahead += 1,
                DependencyStatus::Unknown => summary.unknown += 1,
                DependencyStatus::Error => summary.errors += 1,
            }
            summary.impact_levels.record_impact(result.impact);
            summary.security_risks.record_risk(result.security_risk);
        }

        summary.analyzed = summary.total - summary.errors;
        summary
    }
}
