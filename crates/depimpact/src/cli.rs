//! Command-line interface: argument parsing and the analyze command.

use crate::analysis::AnalysisService;
use crate::error::{RunError, exit_codes};
use crate::project::ProjectValidator;
use crate::report::TextReport;
use clap::{Parser, ValueEnum};
use depimpact_core::{BatchMode, RegistryConfig};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;

/// When to color the text report.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Color when stdout is a terminal and NO_COLOR is unset
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "depimpact", version)]
#[command(about = "Analyze the impact of dependency updates in an npm project", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Analysis completed
    1  Project validation failed
    2  Unexpected error
    3  Invalid manifest or configuration
    4  Some packages could not be analyzed (with --fail-on-errors)")]
pub struct Args {
    /// Project directory containing package.json
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Do not require the project to be a git repository
    #[arg(long)]
    pub skip_git: bool,

    /// Exit with code 4 if any package could not be analyzed
    #[arg(long)]
    pub fail_on_errors: bool,

    /// JSON file with registry client settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Registry base URL
    #[arg(long, env = "DEPIMPACT_REGISTRY", value_name = "URL")]
    pub registry: Option<String>,

    /// Maximum registry requests in flight
    #[arg(long, env = "DEPIMPACT_MAX_CONCURRENT")]
    pub max_concurrent: Option<usize>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Attempts per package, first request included
    #[arg(long)]
    pub retry_attempts: Option<u32>,

    /// Base delay between attempts in milliseconds, doubled after each failure
    #[arg(long)]
    pub retry_delay_ms: Option<u64>,

    /// Fetch in sequential chunks of --max-concurrent packages
    #[arg(long)]
    pub chunked: bool,

    /// Color impact labels in the text report
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, value_name = "WHEN")]
    pub color: ColorMode,
}

impl Args {
    /// Registry settings: the `--config` file (or defaults) with flags applied on top.
    pub fn registry_config(&self) -> depimpact_core::Result<RegistryConfig> {
        let mut config = match &self.config {
            Some(path) => RegistryConfig::from_json(&std::fs::read_to_string(path)?)?,
            None => RegistryConfig::default(),
        };

        if let Some(url) = &self.registry {
            config.registry_url.clone_from(url);
        }
        if let Some(max) = self.max_concurrent {
            config.max_concurrent = max;
        }
        if let Some(timeout) = self.timeout_ms {
            config.timeout_ms = timeout;
        }
        if let Some(attempts) = self.retry_attempts {
            config.retry_attempts = attempts;
        }
        if let Some(delay) = self.retry_delay_ms {
            config.retry_base_delay_ms = delay;
        }
        if self.chunked {
            config.batch_mode = BatchMode::Chunked;
        }

        config.validate()?;
        Ok(config)
    }

    /// Whether the text report is colored. JSON output never is.
    pub fn use_color(&self, stdout_is_terminal: bool) -> bool {
        if self.json {
            return false;
        }
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                stdout_is_terminal
                    && std::env::var_os("NO_COLOR").is_none()
                    && std::env::var("TERM").ok().is_none_or(|term| term != "dumb")
            }
        }
    }
}

/// Validates the project, analyzes it and writes the report to `out`.
///
/// Returns the process exit code for a completed run.
pub async fn run<W: Write>(args: &Args, out: &mut W) -> Result<u8, RunError> {
    let config = args.registry_config()?;

    let validation = ProjectValidator::new(&args.path)
        .check_git(!args.skip_git)
        .validate();
    let (manifest, project) = validation.into_parts().map_err(RunError::Validation)?;
    tracing::info!(
        "analyzing {} ({} dependencies) against {}",
        project.name,
        project.total_dependencies,
        config.registry_url
    );

    let service = AnalysisService::from_config(&config)?;
    let report = service.analyze(&manifest).await?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &report).map_err(depimpact_core::ImpactError::from)?;
        writeln!(out)?;
    } else {
        let color = args.use_color(std::io::stdout().is_terminal());
        colored::control::set_override(color);
        write!(
            out,
            "{}",
            TextReport::new(&report)
                .with_project(&project)
                .with_color(color)
        )?;
    }
    out.flush()?;

    if args.fail_on_errors && report.summary.errors > 0 {
        tracing::warn!("{} packages could not be analyzed", report.summary.errors);
        return Ok(exit_codes::PARTIAL_FAILURE);
    }
    Ok(exit_codes::SUCCESS)
}
