//! Bearer token authentication.

use std::sync::Arc;

use error::AuthError;
use token::TokenValidator;

use crate::user::JwtUser;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(authorization: &str) -> Option<&str> {
    authorization
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

/// Resolves the user behind a request's bearer token.
#[derive(Debug, Clone)]
pub struct JwtGuard {
    validator: Arc<TokenValidator>,
    capability_prefix: Option<Arc<str>>,
}

impl JwtGuard {
    /// Create a guard around a shared validator.
    pub fn new(validator: Arc<TokenValidator>) -> Self {
        Self {
            validator,
            capability_prefix: None,
        }
    }

    /// Set the prefix applied to capability names of resolved users.
    pub fn with_capability_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.capability_prefix = (!prefix.is_empty()).then(|| Arc::from(prefix));
        self
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Validate a raw token and wrap it as a user.
    pub fn validate(&self, token: &str) -> Result<JwtUser, AuthError> {
        let token = self.validator.parse_and_validate(token)?;
        Ok(JwtUser::new(token).with_capability_prefix(self.capability_prefix.clone()))
    }

    /// Resolve the user for an `Authorization` header value.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<JwtUser, AuthError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(AuthError::MissingCredentials)?;
        self.validate(token)
    }

    /// Like [`JwtGuard::authorize`], but any failure is simply "no user".
    /// The reason is logged.
    pub fn authenticate(&self, authorization: Option<&str>) -> Option<JwtUser> {
        match self.authorize(authorization) {
            Ok(user) => Some(user),
            Err(AuthError::Unauthenticated(e)) => {
                tracing::warn!(reason = e.kind(), "JWT authentication failed: {}", e);
                None
            }
            Err(e) => {
                tracing::debug!("JWT authentication skipped: {}", e);
                None
            }
        }
    }
}
