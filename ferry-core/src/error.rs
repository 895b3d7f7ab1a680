//! Error types for descriptor composition

use thiserror::Error;

/// Result type alias for composition operations
pub type Result<T> = std::result::Result<T, DescriptorError>;

/// Errors raised while composing a descriptor
///
/// Everything except `SourceUnreachable` is raised at composition time and
/// aborts before any descriptor part is built. `SourceUnreachable` is only
/// produced by diagnostics, since fetching the source is the build
/// platform's job.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// A required configuration key or secret reference cannot be resolved
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// The resolving identity lacks read access
    #[error("Permission denied reading '{0}'")]
    PermissionDenied(String),

    /// The parameter store could not be reached
    #[error("Parameter store unavailable while reading '{key}': {reason}")]
    StoreUnavailable { key: String, reason: String },

    /// The source repository could not be reached with the given coordinates
    #[error("Source repository '{repository}' unreachable: {reason}")]
    SourceUnreachable { repository: String, reason: String },

    /// None of the candidate working directories exist in the source layout
    #[error("None of the candidate working directories exist: {}", .candidates.join(", "))]
    DirectoryLayoutMismatch { candidates: Vec<String> },

    /// A permission grant falls outside the allow-list
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// The descriptor manifest is malformed
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),
}

impl DescriptorError {
    /// Create an invalid descriptor error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidDescriptor(message.into())
    }

    /// Create a policy violation error
    pub fn policy(message: impl Into<String>) -> Self {
        Self::PolicyViolation(message.into())
    }

    /// Check if this error was raised while resolving configuration
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationMissing(_) | Self::PermissionDenied(_) | Self::StoreUnavailable { .. }
        )
    }
}

/// Errors returned by a parameter store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    #[error("Parameter not found: {0}")]
    NotFound(String),

    #[error("Access denied to parameter: {0}")]
    PermissionDenied(String),

    #[error("Failed to read parameter '{key}': {reason}")]
    Unavailable { key: String, reason: String },
}

impl From<ParameterError> for DescriptorError {
    fn from(err: ParameterError) -> Self {
        match err {
            ParameterError::NotFound(key) => {
                DescriptorError::ConfigurationMissing(format!("parameter '{}' not found", key))
            }
            ParameterError::PermissionDenied(key) => DescriptorError::PermissionDenied(key),
            ParameterError::Unavailable { key, reason } => {
                DescriptorError::StoreUnavailable { key, reason }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_error_mapping() {
        let err: DescriptorError = ParameterError::NotFound("/ns/api".to_string()).into();
        assert!(matches!(err, DescriptorError::ConfigurationMissing(_)));
        assert!(err.to_string().contains("/ns/api"));

        let err: DescriptorError = ParameterError::PermissionDenied("/ns/api".to_string()).into();
        assert!(matches!(err, DescriptorError::PermissionDenied(ref key) if key == "/ns/api"));
        assert!(err.is_resolution_error());
    }

    #[test]
    fn test_layout_mismatch_lists_candidates() {
        let err = DescriptorError::DirectoryLayoutMismatch {
            candidates: vec!["frontend/chat-app".to_string(), "chat-app".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "None of the candidate working directories exist: frontend/chat-app, chat-app"
        );
        assert!(!err.is_resolution_error());
    }
}
