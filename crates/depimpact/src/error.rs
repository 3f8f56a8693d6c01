use depimpact_core::ImpactError;
use thiserror::Error;

/// Process exit codes of the `depimpact` binary.
pub mod exit_codes {
    /// Analysis completed
    pub const SUCCESS: u8 = 0;
    /// The project did not pass validation
    pub const VALIDATION_FAILED: u8 = 1;
    /// Any failure not covered by another code
    pub const UNEXPECTED_ERROR: u8 = 2;
    /// Malformed manifest or configuration
    pub const INVALID_INPUT: u8 = 3;
    /// Some packages could not be analyzed and `--fail-on-errors` was set
    pub const PARTIAL_FAILURE: u8 = 4;
}

/// Errors that end a `depimpact` run.
///
/// Per-package registry failures are not errors here; they are part of the
/// report and only affect the exit code through `--fail-on-errors`.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("project validation failed")]
    Validation(Vec<String>),

    #[error(transparent)]
    Analysis(#[from] ImpactError),

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),
}

impl RunError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => exit_codes::VALIDATION_FAILED,
            Self::Analysis(ImpactError::InvalidInput(_) | ImpactError::InvalidConfig(_)) => {
                exit_codes::INVALID_INPUT
            }
            Self::Analysis(_) | Self::Output(_) => exit_codes::UNEXPECTED_ERROR,
        }
    }
}
