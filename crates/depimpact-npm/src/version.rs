//! Declared-range versus latest-version comparison.
//!
//! Declared ranges use npm semver syntax (`^1.2.0`, `~1.2`, `>=1 <2`, ...).
//! Coverage is checked with `node-semver`; ordering and diff detection work
//! on coerced `major.minor.patch` versions.

use depimpact_core::{DiffKind, VersionComparison};
use semver::Version;
use std::sync::LazyLock;

static NUMERIC_CORE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("numeric core pattern is valid")
});

/// Relaxes a loosely formatted version or range into `major.minor.patch`.
///
/// Takes the first numeric run in the input; missing components become zero
/// and pre-release or build suffixes are dropped.
///
/// # Examples
///
/// ```
/// use depimpact_npm::version::coerce;
///
/// assert_eq!(coerce("^16.8").unwrap().to_string(), "16.8.0");
/// assert_eq!(coerce("v2.0.0-beta.1").unwrap().to_string(), "2.0.0");
/// assert!(coerce("latest").is_none());
/// ```
pub fn coerce(input: &str) -> Option<Version> {
    let captures = NUMERIC_CORE.captures(input)?;
    let component = |idx: usize| -> Option<u64> {
        match captures.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    Some(Version::new(component(1)?, component(2)?, component(3)?))
}

/// Strips leading range operators for display (`^1.2.0` -> `1.2.0`).
pub fn declared_baseline(range: &str) -> &str {
    range
        .trim()
        .trim_start_matches(['^', '~', '>', '<', '=', 'v', ' '])
}

/// Compares a declared range against the latest published version.
///
/// - either input absent or not coercible: `Unknown`
/// - range covers latest: `UpToDate`, impact `Low`; when node-semver cannot
///   parse the range, equal coerced versions count as covered
/// - coerced baseline below latest: `Outdated` with the differing component
/// - otherwise: `Ahead` with a `Custom` diff and `Medium` impact
///
/// # Examples
///
/// ```
/// use depimpact_core::{DiffKind, ImpactLevel, VersionStatus};
/// use depimpact_npm::version::compare;
///
/// let cmp = compare(Some("^16.0.0"), Some("18.2.0"));
/// assert_eq!(cmp.status, VersionStatus::Outdated);
/// assert_eq!(cmp.diff_kind, DiffKind::Major);
/// assert_eq!(cmp.impact, ImpactLevel::High);
/// ```
pub fn compare(declared: Option<&str>, latest: Option<&str>) -> VersionComparison {
    let declared = declared.map(str::trim).filter(|s| !s.is_empty());
    let latest = latest.map(str::trim).filter(|s| !s.is_empty());
    let (Some(declared), Some(latest)) = (declared, latest) else {
        return VersionComparison::UNKNOWN;
    };

    let (Some(baseline), Some(latest)) = (coerce(declared), coerce(latest)) else {
        return VersionComparison::UNKNOWN;
    };

    if range_covers(declared, &latest).unwrap_or(baseline == latest) {
        return VersionComparison::UP_TO_DATE;
    }

    if baseline < latest {
        return VersionComparison::outdated(diff_kind(&baseline, &latest));
    }

    VersionComparison::AHEAD
}

/// Whether the npm range `declared` is satisfied by `version`.
///
/// `None` when node-semver cannot parse the range (aliases, URLs, workspace
/// protocols).
fn range_covers(declared: &str, version: &Version) -> Option<bool> {
    let range = node_semver::Range::parse(declared).ok()?;
    let version = node_semver::Version::parse(version.to_string()).ok()?;
    Some(range.satisfies(&version))
}

fn diff_kind(from: &Version, to: &Version) -> DiffKind {
    if from.major != to.major {
        DiffKind::Major
    } else if from.minor != to.minor {
        DiffKind::Minor
    } else {
        DiffKind::Patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depimpact_core::{ImpactLevel, VersionStatus};

    #[test]
    fn test_coerce() {
        let cases = [
            ("1.2.3", Some("1.2.3")),
            ("^1.2.3", Some("1.2.3")),
            ("~1.2", Some("1.2.0")),
            ("1", Some("1.0.0")),
            ("1.x", Some("1.0.0")),
            (">=1.0.0 <2.0.0", Some("1.0.0")),
            ("v3.4.5-rc.1+build", Some("3.4.5")),
            ("npm:other@2.1.0", Some("2.1.0")),
            ("latest", None),
            ("*", None),
            ("git+https://github.com/user/repo.git", None),
            ("99999999999999999999999.0.0", None),
        ];

        for (input, expected) in cases {
            assert_eq!(
                coerce(input).map(|v| v.to_string()).as_deref(),
                expected,
                "coerce({input})"
            );
        }
    }

    #[test]
    fn test_declared_baseline() {
        assert_eq!(declared_baseline("^1.2.0"), "1.2.0");
        assert_eq!(declared_baseline("~1.2"), "1.2");
        assert_eq!(declared_baseline(">= 2.0.0"), "2.0.0");
        assert_eq!(declared_baseline("1.0.0"), "1.0.0");
        assert_eq!(declared_baseline("latest"), "latest");
    }

    #[test]
    fn test_compare_table() {
        use DiffKind as D;
        use ImpactLevel as I;
        use VersionStatus as S;

        let cases = [
            // range covers latest
            ("^1.0.0", "1.3.0", S::UpToDate, D::None, I::Low),
            ("~1.2.0", "1.2.9", S::UpToDate, D::None, I::Low),
            (">=1.0.0", "4.0.0", S::UpToDate, D::None, I::Low),
            ("1.2.3", "1.2.3", S::UpToDate, D::None, I::Low),
            ("1.x", "1.9.0", S::UpToDate, D::None, I::Low),
            // unparsable range falls back to coerced equality
            ("npm:other@2.1.0", "2.1.0", S::UpToDate, D::None, I::Low),
            // outdated
            ("^16.0.0", "18.2.0", S::Outdated, D::Major, I::High),
            ("~1.2.0", "1.3.0", S::Outdated, D::Minor, I::Medium),
            ("1.2.3", "1.2.4", S::Outdated, D::Patch, I::Low),
            ("1.2.3", "1.3.0", S::Outdated, D::Minor, I::Medium),
            ("^0.21.0", "1.11.0", S::Outdated, D::Major, I::High),
            ("^4.0.0", "5.4.1", S::Outdated, D::Major, I::High),
            // declared baseline ahead of latest
            ("^3.0.0", "2.9.9", S::Ahead, D::Custom, I::Medium),
            ("2.0.0-beta.1", "1.9.0", S::Ahead, D::Custom, I::Medium),
            // parsed range excluding latest is not rescued by equal baselines
            ("<1.0.0", "1.0.0", S::Ahead, D::Custom, I::Medium),
            ("<2.1.0", "2.1.0", S::Ahead, D::Custom, I::Medium),
        ];

        for (declared, latest, status, diff, impact) in cases {
            let cmp = compare(Some(declared), Some(latest));
            assert_eq!(cmp.status, status, "{declared} vs {latest}");
            assert_eq!(cmp.diff_kind, diff, "{declared} vs {latest}");
            assert_eq!(cmp.impact, impact, "{declared} vs {latest}");
        }
    }

    #[test]
    fn test_compare_unknown_inputs() {
        let unknown = [
            (None, Some("1.0.0")),
            (Some("^1.0.0"), None),
            (Some(""), Some("1.0.0")),
            (Some("latest"), Some("1.0.0")),
            (Some("file:../local"), Some("1.0.0")),
            (Some("^1.0.0"), Some("not-a-version")),
        ];

        for (declared, latest) in unknown {
            assert_eq!(
                compare(declared, latest),
                VersionComparison::UNKNOWN,
                "{declared:?} vs {latest:?}"
            );
        }
    }

    #[test]
    fn test_major_gap_is_always_high_impact() {
        for major in 0..10u64 {
            let declared = format!("^{major}.4.2");
            for bump in 1..4u64 {
                let latest = format!("{}.0.0", major + bump);
                let cmp = compare(Some(&declared), Some(&latest));
                assert_eq!(cmp.impact, ImpactLevel::High, "{declared} vs {latest}");
                assert_eq!(cmp.diff_kind, DiffKind::Major, "{declared} vs {latest}");
            }
        }
    }

    #[test]
    fn test_covering_range_is_always_up_to_date() {
        for minor in 0..10u64 {
            for patch in 0..5u64 {
                let latest = format!("3.{minor}.{patch}");
                let cmp = compare(Some("^3.0.0"), Some(&latest));
                assert_eq!(cmp.status, VersionStatus::UpToDate, "^3.0.0 vs {latest}");
                assert_eq!(cmp.impact, ImpactLevel::Low, "^3.0.0 vs {latest}");
            }
        }
    }

    #[test]
    fn test_compare_is_deterministic() {
        let first = compare(Some("^16.0.0"), Some("18.2.0"));
        for _ in 0..100 {
            assert_eq!(compare(Some("^16.0.0"), Some("18.2.0")), first);
        }
    }
}
