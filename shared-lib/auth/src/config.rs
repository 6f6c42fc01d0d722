//! Authentication configuration.

use std::fmt;
use std::sync::Arc;

use error::ConfigurationError;
use serde::Deserialize;
use token::TokenValidator;

use crate::guard::JwtGuard;

/// Environment variable holding the shared secret.
pub const SECRET_ENV: &str = "JWT_SECRET";

/// Environment variable holding the optional capability prefix.
pub const CAPABILITY_PREFIX_ENV: &str = "JWT_CAPABILITY_PREFIX";

/// Authentication configuration.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Shared HS256 secret
    pub secret: String,
    /// Prefix applied to capability names before lookup
    #[serde(default)]
    pub capability_prefix: Option<String>,
}

impl AuthConfig {
    /// Create a new configuration.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            capability_prefix: None,
        }
    }

    /// Set the capability prefix. An empty prefix disables prefixing.
    pub fn with_capability_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.capability_prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let secret = std::env::var(SECRET_ENV)
            .map_err(|_| ConfigurationError::MissingSecret(SECRET_ENV))?;
        if secret.is_empty() {
            return Err(ConfigurationError::EmptySecret);
        }

        let mut config = Self::new(secret);
        if let Ok(prefix) = std::env::var(CAPABILITY_PREFIX_ENV) {
            config = config.with_capability_prefix(prefix);
        }

        Ok(config)
    }

    /// Build the validator for this secret.
    pub fn validator(&self) -> Result<TokenValidator, ConfigurationError> {
        TokenValidator::new(&self.secret)
    }

    /// Build a guard sharing a single validator.
    pub fn build_guard(&self) -> Result<JwtGuard, ConfigurationError> {
        let guard = JwtGuard::new(Arc::new(self.validator()?));
        Ok(match &self.capability_prefix {
            Some(prefix) => guard.with_capability_prefix(prefix.as_str()),
            None => guard,
        })
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("capability_prefix", &self.capability_prefix)
            .finish()
    }
}
