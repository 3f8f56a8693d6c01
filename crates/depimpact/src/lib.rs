//! Dependency update impact analysis for npm projects.
//!
//! Reads a project's package.json, looks every dependency up in the npm
//! registry through [`depimpact_core::RegistryClient`] and ranks the results
//! by how disruptive an upgrade would be.

pub mod analysis;
pub mod cli;
pub mod error;
pub mod project;
pub mod report;
pub mod summary;

// Re-export commonly used types
pub use analysis::{AnalysisReport, AnalysisResult, AnalysisService, DependencyStatus};
pub use error::{RunError, exit_codes};
pub use project::{ProjectSummary, ProjectValidator, ValidationReport};
pub use report::TextReport;
pub use summary::{AnalysisSummary, LevelCounts, PerformanceSnapshot};
