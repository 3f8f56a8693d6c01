//! Pre-flight checks on the project directory.
//!
//! A project is analyzable when it holds a package.json with a name and at
//! least one dependency section, and (unless disabled) is a git repository
//! with at least one commit.

use depimpact_npm::manifest::{parse_manifest, section_counts};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const NO_PACKAGE_JSON: &str = "No package.json found. This doesn't appear to be an npm project.";
const MISSING_NAME: &str = "package.json is missing required \"name\" field";
const NO_DEPENDENCIES: &str = "No dependencies found in package.json. Nothing to analyze.";
const GIT_NO_DIR: &str = "No .git directory found. This project must be a git repository.";
const GIT_NO_CONFIG: &str = "Git repository appears to be corrupted (no config file found).";
const GIT_NO_COMMITS: &str = "Git repository has no commits. Please make an initial commit first.";

/// Basic facts about a validated project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub name: String,
    pub version: String,
    pub dependency_count: usize,
    pub dev_dependency_count: usize,
    pub total_dependencies: usize,
    pub project_path: PathBuf,
}

impl ProjectSummary {
    fn from_manifest(manifest: &Value, project_path: &Path) -> Self {
        let field = |key: &str, default: &str| {
            manifest
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };
        let (dependency_count, dev_dependency_count) = section_counts(manifest);

        Self {
            name: field("name", "Unknown"),
            version: field("version", "0.0.0"),
            dependency_count,
            dev_dependency_count,
            total_dependencies: dependency_count + dev_dependency_count,
            project_path: project_path.to_path_buf(),
        }
    }
}

/// Outcome of [`ProjectValidator::validate`]. All failed checks are listed.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub manifest: Option<Value>,
    pub summary: Option<ProjectSummary>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.manifest.is_some()
    }

    /// Splits a valid report into the parsed manifest and its summary.
    ///
    /// Returns the collected errors when validation failed.
    pub fn into_parts(self) -> Result<(Value, ProjectSummary), Vec<String>> {
        match (self.errors.is_empty(), self.manifest, self.summary) {
            (true, Some(manifest), Some(summary)) => Ok((manifest, summary)),
            _ => Err(self.errors),
        }
    }
}

/// Validates a project directory before analysis.
///
/// # Examples
///
/// ```no_run
/// use depimpact::ProjectValidator;
///
/// let report = ProjectValidator::new(".").check_git(false).validate();
/// for error in &report.errors {
///     eprintln!("{error}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ProjectValidator {
    root: PathBuf,
    check_git: bool,
}

impl ProjectValidator {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            root: std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf()),
            check_git: true,
        }
    }

    /// Enables or disables the git repository check.
    #[must_use]
    pub const fn check_git(mut self, enabled: bool) -> Self {
        self.check_git = enabled;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        match validate_npm_project(&self.root) {
            Ok(manifest) => {
                report.summary = Some(ProjectSummary::from_manifest(&manifest, &self.root));
                report.manifest = Some(manifest);
            }
            Err(message) => report.errors.push(message),
        }

        if self.check_git
            && let Err(message) = validate_git_project(&self.root)
        {
            report.errors.push(message);
        }

        if !report.errors.is_empty() {
            tracing::debug!("validation of {} failed: {:?}", self.root.display(), report.errors);
        }
        report
    }
}

fn validate_npm_project(root: &Path) -> Result<Value, String> {
    let path = root.join("package.json");
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(NO_PACKAGE_JSON.to_string()),
        Err(e) => return Err(format!("Failed to read {}: {}", path.display(), e)),
    };

    let manifest = parse_manifest(&content).map_err(|e| e.to_string())?;

    let has_name = manifest
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
        return Err(MISSING_NAME.to_string());
    }

    let has_section = |key: &str| manifest.get(key).is_some_and(|v| !v.is_null());
    if !has_section("dependencies") && !has_section("devDependencies") {
        return Err(NO_DEPENDENCIES.to_string());
    }

    Ok(manifest)
}

fn validate_git_project(root: &Path) -> Result<(), String> {
    let git_dir = root.join(".git");
    if !git_dir.is_dir() {
        return Err(GIT_NO_DIR.to_string());
    }
    if !git_dir.join("config").is_file() {
        return Err(GIT_NO_CONFIG.to_string());
    }

    let has_heads = fs::read_dir(git_dir.join("refs").join("heads"))
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false);
    if !has_heads && !git_dir.join("packed-refs").is_file() {
        return Err(GIT_NO_COMMITS.to_string());
    }

    Ok(())
}
