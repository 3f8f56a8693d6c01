//! Human-readable rendering of an analysis report.

use crate::analysis::{AnalysisReport, AnalysisResult, DependencyStatus};
use crate::project::ProjectSummary;
use colored::Colorize;
use depimpact_core::{DependencyKind, DiffKind, ImpactLevel};
use std::fmt;

const DESCRIPTION_WIDTH: usize = 80;

/// Plain-text report, written section by section.
///
/// Sections without entries are omitted. Impact labels are colored only
/// when enabled with [`TextReport::with_color`].
pub struct TextReport<'a> {
    report: &'a AnalysisReport,
    project: Option<&'a ProjectSummary>,
    color: bool,
}

impl<'a> TextReport<'a> {
    pub const fn new(report: &'a AnalysisReport) -> Self {
        Self {
            report,
            project: None,
            color: false,
        }
    }

    #[must_use]
    pub const fn with_project(mut self, project: &'a ProjectSummary) -> Self {
        self.project = Some(project);
        self
    }

    #[must_use]
    pub const fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    fn impact_tag(&self, impact: ImpactLevel) -> String {
        let label = impact_label(impact);
        if !self.color {
            return label.to_string();
        }
        match impact {
            ImpactLevel::High => label.red().bold().to_string(),
            ImpactLevel::Medium => label.yellow().to_string(),
            ImpactLevel::Low => label.green().to_string(),
            ImpactLevel::Unknown => label.dimmed().to_string(),
        }
    }

    fn write_project(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(project) = self.project else {
            return Ok(());
        };
        writeln!(f, "PROJECT")?;
        writeln!(f, "  Name: {}", project.name)?;
        writeln!(f, "  Version: {}", project.version)?;
        writeln!(f, "  Path: {}", project.project_path.display())?;
        writeln!(f, "  Dependencies: {}", project.dependency_count)?;
        writeln!(f, "  Dev Dependencies: {}", project.dev_dependency_count)?;
        writeln!(f)
    }

    fn write_summary(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = &self.report.summary;
        writeln!(f, "DEPENDENCY ANALYSIS RESULTS")?;
        writeln!(f, "  Total Dependencies: {}", summary.total)?;
        writeln!(f, "  Successfully Analyzed: {}/{}", summary.analyzed, summary.total)?;
        writeln!(f, "  Up to Date: {}", summary.up_to_date)?;
        writeln!(f, "  Outdated: {}", summary.outdated)?;
        if summary.ahead > 0 {
            writeln!(f, "  Ahead of Registry: {}", summary.ahead)?;
        }
        if summary.unknown > 0 {
            writeln!(f, "  Unknown: {}", summary.unknown)?;
        }
        if summary.errors > 0 {
            writeln!(f, "  Errors: {}", summary.errors)?;
        }

        writeln!(f)?;
        writeln!(f, "Impact Levels:")?;
        writeln!(f, "  High Impact: {}", summary.impact_levels.high)?;
        writeln!(f, "  Medium Impact: {}", summary.impact_levels.medium)?;
        writeln!(f, "  Low Impact: {}", summary.impact_levels.low)?;

        writeln!(f)?;
        writeln!(f, "Security Risk Assessment:")?;
        writeln!(f, "  High Risk: {}", summary.security_risks.high)?;
        writeln!(f, "  Medium Risk: {}", summary.security_risks.medium)?;
        writeln!(f, "  Low Risk: {}", summary.security_risks.low)
    }

    fn write_outdated(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut outdated = self
            .report
            .results
            .iter()
            .filter(|r| r.status == DependencyStatus::Outdated)
            .peekable();
        if outdated.peek().is_none() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "OUTDATED DEPENDENCIES")?;
        for dep in outdated {
            writeln!(
                f,
                "  [{}] [{}] {}: {} -> {} ({})",
                self.impact_tag(dep.impact),
                kind_label(dep.kind),
                dep.name,
                current(dep),
                latest(dep),
                diff_label(dep.diff_kind)
            )?;
            if let Some(description) = &dep.description {
                writeln!(f, "      Description: {}", truncate(description, DESCRIPTION_WIDTH))?;
            }
        }
        Ok(())
    }

    fn write_deprecated(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut deprecated = self
            .report
            .results
            .iter()
            .filter_map(|r| r.deprecated.as_deref().map(|message| (r, message)))
            .peekable();
        if deprecated.peek().is_none() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "DEPRECATED DEPENDENCIES")?;
        for (dep, message) in deprecated {
            writeln!(f, "  {}: {}", dep.name, current(dep))?;
            writeln!(f, "      {}", message)?;
        }
        Ok(())
    }

    fn write_high_impact(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut high = self
            .report
            .results
            .iter()
            .filter(|r| r.impact == ImpactLevel::High)
            .peekable();
        if high.peek().is_none() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "HIGH IMPACT UPDATES")?;
        for dep in high {
            writeln!(f, "  {}: {} -> {}", dep.name, current(dep), latest(dep))?;
            writeln!(f, "      Update Type: {}", diff_label(dep.diff_kind))?;
            if let Some(repository) = &dep.repository_url {
                writeln!(f, "      Repository: {}", repository)?;
            }
        }
        Ok(())
    }

    fn write_errors(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.report.summary.errors == 0 {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "ANALYSIS ERRORS")?;
        for dep in self.report.errors() {
            writeln!(f, "  {}: {}", dep.name, dep.error.as_deref().unwrap_or("unknown error"))?;
        }
        Ok(())
    }

    fn write_performance(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let perf = &self.report.summary.performance;
        writeln!(f)?;
        writeln!(f, "PERFORMANCE METRICS")?;
        writeln!(f, "  Success Rate: {}%", perf.success_rate)?;
        writeln!(f, "  Network Requests: {}", perf.network_requests)?;
        writeln!(f, "  Cached Packages: {}", self.report.cache_stats.cache_size)
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_project(f)?;
        self.write_summary(f)?;
        self.write_outdated(f)?;
        self.write_deprecated(f)?;
        self.write_high_impact(f)?;
        self.write_errors(f)?;
        self.write_performance(f)
    }
}

fn current(dep: &AnalysisResult) -> &str {
    dep.current_version.as_deref().unwrap_or("?")
}

fn latest(dep: &AnalysisResult) -> &str {
    dep.latest_version.as_deref().unwrap_or("?")
}

const fn impact_label(impact: ImpactLevel) -> &'static str {
    match impact {
        ImpactLevel::High => "high",
        ImpactLevel::Medium => "medium",
        ImpactLevel::Low => "low",
        ImpactLevel::Unknown => "unknown",
    }
}

const fn kind_label(kind: DependencyKind) -> &'static str {
    match kind {
        DependencyKind::Production => "prod",
        DependencyKind::Development => "dev",
    }
}

const fn diff_label(diff: DiffKind) -> &'static str {
    match diff {
        DiffKind::Major => "major",
        DiffKind::Minor => "minor",
        DiffKind::Patch => "patch",
        DiffKind::Custom => "custom",
        DiffKind::None => "none",
    }
}

/// Cuts `text` to at most `width` characters, marking the cut with `...`.
fn truncate(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::{AnalysisSummary, PerformanceSnapshot};
    use depimpact_core::{
        CacheStats, DependencyDeclaration, FetchError, RegistryRecord, VersionComparison,
    };

    fn sample_report() -> AnalysisReport {
        let react = DependencyDeclaration::new("react", Some("^16.0.0"), DependencyKind::Production);
        let mut record = RegistryRecord::with_latest("react", "18.2.0");
        record.repository_url = Some("https://github.com/facebook/react".into());
        record.description = Some("React is a JavaScript library for building user interfaces.".into());

        let request = DependencyDeclaration::new("request", Some("~2.88.0"), DependencyKind::Development);
        let mut deprecated = RegistryRecord::with_latest("request", "2.88.2");
        deprecated.deprecated = Some("request has been deprecated".into());

        let ghost = DependencyDeclaration::new("ghost", Some("1.0.0"), DependencyKind::Production);

        let results = vec![
            AnalysisResult::classified(&react, &record, VersionComparison::outdated(DiffKind::Major)),
            AnalysisResult::classified(&request, &deprecated, VersionComparison::UP_TO_DATE),
            AnalysisResult::errored(&ghost, &FetchError::not_found("ghost")),
        ];
        let perf = PerformanceSnapshot {
            requested: 3,
            succeeded: 2,
            failed: 1,
            success_rate: 67,
            network_requests: 3,
            cache_size: 3,
        };
        AnalysisReport {
            summary: AnalysisSummary::from_results(&results, perf),
            results,
            cache_stats: CacheStats {
                cache_size: 3,
                pending_count: 0,
                network_requests: 3,
            },
        }
    }

    #[test]
    fn test_text_report_sections() {
        let report = sample_report();
        let text = TextReport::new(&report).to_string();

        assert!(text.contains("Total Dependencies: 3"));
        assert!(text.contains("Successfully Analyzed: 2/3"));
        assert!(text.contains("Errors: 1"));
        assert!(text.contains("[high] [prod] react: 16.0.0 -> 18.2.0 (major)"));
        assert!(!text.contains('\u{1b}'));
        assert!(text.contains("DEPRECATED DEPENDENCIES"));
        assert!(text.contains("request has been deprecated"));
        assert!(text.contains("Repository: https://github.com/facebook/react"));
        assert!(text.contains(r#"ghost: package "ghost" not found"#));
        assert!(text.contains("Success Rate: 67%"));
        assert!(!text.contains("PROJECT"));
    }

    #[test]
    fn test_text_report_with_project() {
        let report = sample_report();
        let project = ProjectSummary {
            name: "demo".into(),
            version: "1.0.0".into(),
            dependency_count: 2,
            dev_dependency_count: 1,
            total_dependencies: 3,
            project_path: "/tmp/demo".into(),
        };

        let text = TextReport::new(&report).with_project(&project).to_string();

        assert!(text.starts_with("PROJECT\n  Name: demo\n"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let report = AnalysisReport {
            results: Vec::new(),
            summary: AnalysisSummary::empty(),
            cache_stats: CacheStats::default(),
        };

        let text = TextReport::new(&report).to_string();

        assert!(text.contains("Total Dependencies: 0"));
        assert!(!text.contains("OUTDATED DEPENDENCIES"));
        assert!(!text.contains("ANALYSIS ERRORS"));
        assert!(text.contains("Success Rate: 0%"));
    }

    #[test]
    fn test_colored_impact_labels() {
        colored::control::set_override(true);
        let report = sample_report();

        let text = TextReport::new(&report).with_color(true).to_string();
        let high = "high".red().bold().to_string();
        colored::control::unset_override();

        assert!(text.contains(&format!("[{high}] [prod] react")));
        assert!(text.contains('\u{1b}'));
        assert!(text.contains("Total Dependencies: 3"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 80), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("héllo wörld", 5), "héllo...");
    }
}
