//! Common error types for JWT handling.
//!
//! Decode and validation failures are recoverable signals about untrusted
//! input. Encoding and configuration failures are internal faults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A token (or one of its segments) could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid JWT format")]
    InvalidFormat,

    #[error("Cannot decode {component}: {source}")]
    Component {
        component: &'static str,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("Invalid base64url data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a JSON object")]
    NotAnObject,

    #[error("Missing \"{0}\" in JWT header")]
    MissingHeaderField(&'static str),

    #[error("Missing required fields in JWT payload")]
    MissingPayloadFields,

    #[error("Invalid date format in JWT payload: {0}")]
    InvalidDate(#[source] chrono::ParseError),

    #[error("Invalid \"{field}\" in JWT {context}: expected {expected}")]
    InvalidField {
        context: &'static str,
        field: &'static str,
        expected: &'static str,
    },
}

impl DecodeError {
    /// Wrap this error with the name of the component that failed to decode.
    pub fn within(self, component: &'static str) -> Self {
        Self::Component {
            component,
            source: Box::new(self),
        }
    }
}

/// A well-formed token was rejected by one of the validation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid JWT signature")]
    InvalidSignature,

    #[error("Invalid JWT header")]
    InvalidHeader,

    #[error("JWT token has expired")]
    Expired,
}

/// Serializing a token component failed.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Error encoding JWT {component}: {source}")]
    Json {
        component: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Startup configuration is unusable.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("JWT secret must not be empty")]
    EmptySecret,

    #[error("JWT secret is not configured (set {0})")]
    MissingSecret(&'static str),

    #[error("JWT secret rejected: {0}")]
    InvalidSecret(String),
}

/// Any failure of the parse-and-validate pipeline.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

impl TokenError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Validation(ValidationError::InvalidSignature) => "signature",
            Self::Validation(ValidationError::InvalidHeader) => "header",
            Self::Validation(ValidationError::Expired) => "expired",
            Self::Encoding(_) => "encoding",
        }
    }
}

/// Authentication-related errors raised at the request boundary.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingCredentials,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] TokenError),

    #[error("Missing capability \"{0}\"")]
    Forbidden(String),
}

/// Error response for API clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Add details to the error response.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<&AuthError> for ErrorResponse {
    fn from(err: &AuthError) -> Self {
        match err {
            // The reason a token was refused stays in the logs.
            AuthError::MissingCredentials | AuthError::Unauthenticated(_) => {
                tracing::debug!(reason = %err, "Rejecting unauthenticated request");
                Self::new("AUTH_UNAUTHENTICATED", "Unauthenticated")
            }
            AuthError::Forbidden(capability) => {
                Self::new("AUTH_FORBIDDEN", "Access forbidden").with_details(capability.clone())
            }
        }
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        Self::from(&err)
    }
}

/// Result type alias for the token pipeline.
pub type Result<T> = std::result::Result<T, TokenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_message_names_component() {
        let err = DecodeError::MissingHeaderField("alg").within("Header");
        assert_eq!(err.to_string(), "Cannot decode Header: Missing \"alg\" in JWT header");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_token_error_kind() {
        assert_eq!(TokenError::from(DecodeError::InvalidFormat).kind(), "decode");
        assert_eq!(TokenError::from(ValidationError::Expired).kind(), "expired");
        assert_eq!(
            TokenError::from(ValidationError::InvalidSignature).to_string(),
            "Invalid JWT signature"
        );
    }

    #[test]
    fn test_error_response_hides_token_reason() {
        let err = AuthError::from(TokenError::from(ValidationError::InvalidSignature));
        let response = ErrorResponse::from(&err);
        assert_eq!(response.code, "AUTH_UNAUTHENTICATED");
        assert!(!response.message.contains("signature"));
        assert!(response.details.is_none());

        let response = ErrorResponse::from(AuthError::MissingCredentials);
        assert_eq!(response.code, "AUTH_UNAUTHENTICATED");
    }

    #[test]
    fn test_forbidden_response_details() {
        let response = ErrorResponse::from(AuthError::Forbidden("admin-model".into()));
        assert_eq!(response.code, "AUTH_FORBIDDEN");
        assert_eq!(response.details.as_deref(), Some("admin-model"));
    }
}
