use thiserror::Error;

/// Terminal failure of a single package lookup.
///
/// Fetch errors are cached next to successful records and handed to every
/// caller waiting on the same in-flight request, so they must be `Clone`.
/// Transport causes are stored as a message.
///
/// # Examples
///
/// ```
/// use depimpact_core::error::{FetchError, FetchErrorKind};
///
/// let err = FetchError::not_found("left-pad");
/// assert_eq!(err.kind(), FetchErrorKind::NotFound);
/// assert_eq!(err.to_string(), "package \"left-pad\" not found");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("package \"{package}\" not found")]
    NotFound { package: String },

    #[error("rate limit exceeded for package \"{package}\"")]
    RateLimited { package: String },

    #[error("request timeout for package \"{package}\"")]
    Timeout { package: String },

    #[error("failed to fetch package \"{package}\": {message}")]
    Transport { package: String, message: String },
}

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchErrorKind {
    NotFound,
    RateLimited,
    Timeout,
    Transport,
}

impl FetchError {
    pub fn not_found(package: impl Into<String>) -> Self {
        Self::NotFound {
            package: package.into(),
        }
    }

    pub fn rate_limited(package: impl Into<String>) -> Self {
        Self::RateLimited {
            package: package.into(),
        }
    }

    pub fn timeout(package: impl Into<String>) -> Self {
        Self::Timeout {
            package: package.into(),
        }
    }

    pub fn transport(package: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            package: package.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::NotFound { .. } => FetchErrorKind::NotFound,
            Self::RateLimited { .. } => FetchErrorKind::RateLimited,
            Self::Timeout { .. } => FetchErrorKind::Timeout,
            Self::Transport { .. } => FetchErrorKind::Transport,
        }
    }

    /// Package name the failure belongs to.
    pub fn package(&self) -> &str {
        match self {
            Self::NotFound { package }
            | Self::RateLimited { package }
            | Self::Timeout { package }
            | Self::Transport { package, .. } => package,
        }
    }
}

/// Core error types for depimpact.
///
/// Only [`ImpactError::InvalidInput`] and [`ImpactError::InvalidConfig`] are
/// fatal for an analysis run. Per-package fetch failures are normally kept
/// inside the batch result; the `Fetch` variant exists for callers that use
/// `RegistryClient::fetch_one` directly and want a single error type.
#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for `Result<T, ImpactError>`.
///
/// # Examples
///
/// ```
/// use depimpact_core::error::{ImpactError, Result};
///
/// fn require_name(name: &str) -> Result<&str> {
///     if name.is_empty() {
///         return Err(ImpactError::InvalidInput("empty name".into()));
///     }
///     Ok(name)
/// }
///
/// assert!(require_name("").is_err());
/// ```
pub type Result<T> = std::result::Result<T, ImpactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(
            FetchError::rate_limited("react").to_string(),
            "rate limit exceeded for package \"react\""
        );
        assert_eq!(
            FetchError::timeout("react").to_string(),
            "request timeout for package \"react\""
        );
        assert_eq!(
            FetchError::transport("react", "connection reset").to_string(),
            "failed to fetch package \"react\": connection reset"
        );
    }

    #[test]
    fn test_fetch_error_kind_and_package() {
        let err = FetchError::transport("@scope/pkg", "boom");
        assert_eq!(err.kind(), FetchErrorKind::Transport);
        assert_eq!(err.package(), "@scope/pkg");
        assert_eq!(FetchError::not_found("x").kind(), FetchErrorKind::NotFound);
    }

    #[test]
    fn test_fetch_error_converts_into_impact_error() {
        let err: ImpactError = FetchError::not_found("missing").into();
        assert!(matches!(err, ImpactError::Fetch(FetchError::NotFound { .. })));
        assert_eq!(err.to_string(), "package \"missing\" not found");
    }

    #[test]
    fn test_invalid_input_display() {
        let err = ImpactError::InvalidInput("manifest must be a JSON object".into());
        assert_eq!(
            err.to_string(),
            "invalid input: manifest must be a JSON object"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ImpactError = io_err.into();
        assert!(error.to_string().contains("I/O error"));
    }
}
