//! Domain types shared by the registry client and the analysis stage.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Which manifest section a dependency was declared in.
///
/// A name listed in both sections is treated as `Production`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Production,
    Development,
}

/// A dependency as written in the manifest.
///
/// `declared_range` is `None` when the manifest value was not a string.
///
/// # Examples
///
/// ```
/// use depimpact_core::types::{DependencyDeclaration, DependencyKind};
///
/// let dep = DependencyDeclaration::new("react", Some("^18.2.0"), DependencyKind::Production);
/// assert_eq!(dep.declared_range.as_deref(), Some("^18.2.0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyDeclaration {
    pub name: String,
    pub declared_range: Option<String>,
    pub kind: DependencyKind,
}

impl DependencyDeclaration {
    pub fn new(name: impl Into<String>, declared_range: Option<&str>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            declared_range: declared_range.map(String::from),
            kind,
        }
    }
}

/// The subset of a registry document that the analysis stage consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryRecord {
    pub name: String,
    pub latest_version: Option<String>,
    pub description: Option<String>,
    pub repository_url: Option<String>,
    pub homepage: Option<String>,
    pub license: Option<String>,
    pub deprecated: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub version_count: usize,
}

impl RegistryRecord {
    /// Minimal record with only a name and latest version, mostly for tests.
    pub fn with_latest(name: impl Into<String>, latest: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latest_version: Some(latest.into()),
            ..Self::default()
        }
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }
}

/// Outcome of comparing a declared range against the latest version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionStatus {
    UpToDate,
    Outdated,
    Ahead,
    Unknown,
}

/// Highest-order version component that differs.
///
/// `Custom` marks a declared baseline that is ahead of the latest release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Major,
    Minor,
    Patch,
    Custom,
    None,
}

/// Qualitative cost of upgrading a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl ImpactLevel {
    /// Sort weight, higher is more severe.
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Unknown => 0,
        }
    }

    pub const fn from_diff(diff: DiffKind) -> Self {
        match diff {
            DiffKind::Major => Self::High,
            DiffKind::Minor => Self::Medium,
            DiffKind::Patch => Self::Low,
            DiffKind::Custom | DiffKind::None => Self::Unknown,
        }
    }
}

/// Risk classification, independent of the upgrade impact.
///
/// `Unknown` is only assigned to dependencies whose registry lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityRisk {
    High,
    Medium,
    Low,
    Unknown,
}

/// Result of the version comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionComparison {
    pub status: VersionStatus,
    pub diff_kind: DiffKind,
    pub impact: ImpactLevel,
}

impl VersionComparison {
    pub const UNKNOWN: Self = Self {
        status: VersionStatus::Unknown,
        diff_kind: DiffKind::None,
        impact: ImpactLevel::Unknown,
    };

    pub const UP_TO_DATE: Self = Self {
        status: VersionStatus::UpToDate,
        diff_kind: DiffKind::None,
        impact: ImpactLevel::Low,
    };

    pub const AHEAD: Self = Self {
        status: VersionStatus::Ahead,
        diff_kind: DiffKind::Custom,
        impact: ImpactLevel::Medium,
    };

    pub const fn outdated(diff_kind: DiffKind) -> Self {
        Self {
            status: VersionStatus::Outdated,
            diff_kind,
            impact: ImpactLevel::from_diff(diff_kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_impact_rank_ordering() {
        assert!(ImpactLevel::High.rank() > ImpactLevel::Medium.rank());
        assert!(ImpactLevel::Medium.rank() > ImpactLevel::Low.rank());
        assert!(ImpactLevel::Low.rank() > ImpactLevel::Unknown.rank());
    }

    #[test]
    fn test_outdated_maps_diff_to_impact() {
        assert_eq!(
            VersionComparison::outdated(DiffKind::Major).impact,
            ImpactLevel::High
        );
        assert_eq!(
            VersionComparison::outdated(DiffKind::Minor).impact,
            ImpactLevel::Medium
        );
        assert_eq!(
            VersionComparison::outdated(DiffKind::Patch).impact,
            ImpactLevel::Low
        );
    }

    #[test]
    fn test_record_deprecation_flag() {
        let mut record = RegistryRecord::with_latest("request", "2.88.2");
        assert!(!record.is_deprecated());
        record.deprecated = Some("request has been deprecated".into());
        assert!(record.is_deprecated());
    }

    #[test]
    fn test_serialized_enum_names() {
        assert_eq!(
            serde_json::to_string(&VersionStatus::UpToDate).unwrap(),
            "\"up-to-date\""
        );
        assert_eq!(
            serde_json::to_string(&DependencyKind::Development).unwrap(),
            "\"development\""
        );
    }
}
