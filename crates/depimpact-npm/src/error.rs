//! Errors specific to npm manifests and registry documents.

use thiserror::Error;

/// Errors specific to npm/JavaScript dependency handling.
///
/// These cover reading package.json content and extracting fields from
/// npm registry documents. Network failures are reported as
/// [`depimpact_core::FetchError`] instead, since they are cached per package.
#[derive(Error, Debug)]
pub enum NpmError {
    /// Failed to parse package.json
    #[error("Failed to parse package.json: {source}")]
    JsonParseError {
        #[source]
        source: serde_json::Error,
    },

    /// Failed to deserialize npm API response
    #[error("Failed to parse npm API response for '{package}': {source}")]
    ApiResponseError {
        package: String,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid package.json structure
    #[error("Invalid package.json structure: {message}")]
    InvalidStructure { message: String },
}

/// Result type alias for npm operations.
pub type Result<T> = std::result::Result<T, NpmError>;

impl NpmError {
    /// Create an API response error.
    pub fn api_response_error(package: impl Into<String>, error: serde_json::Error) -> Self {
        Self::ApiResponseError {
            package: package.into(),
            source: error,
        }
    }

    /// Create an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}

/// Convert to depimpact_core::ImpactError for interoperability
impl From<NpmError> for depimpact_core::ImpactError {
    fn from(err: NpmError) -> Self {
        match err {
            NpmError::JsonParseError { source } => depimpact_core::ImpactError::Json(source),
            NpmError::ApiResponseError { package, source } => depimpact_core::ImpactError::Fetch(
                depimpact_core::FetchError::transport(package, source.to_string()),
            ),
            NpmError::InvalidStructure { message } => {
                depimpact_core::ImpactError::InvalidInput(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NpmError::invalid_structure("manifest must be a JSON object");
        assert_eq!(
            err.to_string(),
            "Invalid package.json structure: manifest must be a JSON object"
        );

        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err = NpmError::api_response_error("lodash", json_err);
        assert!(err.to_string().starts_with("Failed to parse npm API response for 'lodash'"));
    }

    #[test]
    fn test_conversion_to_impact_error() {
        let err: depimpact_core::ImpactError = NpmError::invalid_structure("bad").into();
        assert!(matches!(err, depimpact_core::ImpactError::InvalidInput(_)));

        let json_err = serde_json::from_str::<serde_json::Value>("[").unwrap_err();
        let err: depimpact_core::ImpactError = NpmError::api_response_error("x", json_err).into();
        assert!(matches!(
            err,
            depimpact_core::ImpactError::Fetch(depimpact_core::FetchError::Transport { .. })
        ));
    }
}
