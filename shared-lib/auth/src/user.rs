//! Authenticated user backed by a validated token.

use std::borrow::Cow;
use std::sync::Arc;

use error::AuthError;
use token::{Token, CLIENT_SCOPE};

/// The identity behind a validated bearer token.
#[derive(Debug, Clone)]
pub struct JwtUser {
    token: Token,
    capability_prefix: Option<Arc<str>>,
}

impl JwtUser {
    /// Wrap a validated token.
    pub fn new(token: Token) -> Self {
        Self {
            token,
            capability_prefix: None,
        }
    }

    pub(crate) fn with_capability_prefix(mut self, prefix: Option<Arc<str>>) -> Self {
        self.capability_prefix = prefix;
        self
    }

    /// User ID (the `sub` claim).
    pub fn id(&self) -> i64 {
        self.token.payload.subject
    }

    /// Name of the claim carrying the user ID.
    pub fn identifier_name(&self) -> &'static str {
        "sub"
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn into_token(self) -> Token {
        self.token
    }

    /// Check a capability granted client-wide or for `project_id`.
    pub fn can(&self, capability: &str, project_id: Option<i64>) -> bool {
        let capability = self.normalize(capability);
        let capabilities = &self.token.payload.capabilities;

        if capabilities.contains(CLIENT_SCOPE, &capability) {
            return true;
        }

        project_id.is_some_and(|id| capabilities.contains(&id.to_string(), &capability))
    }

    /// True when every capability is granted. Vacuously true for none.
    pub fn can_all<'a>(
        &self,
        capabilities: impl IntoIterator<Item = &'a str>,
        project_id: Option<i64>,
    ) -> bool {
        capabilities
            .into_iter()
            .all(|capability| self.can(capability, project_id))
    }

    /// True when at least one capability is granted.
    pub fn can_any<'a>(
        &self,
        capabilities: impl IntoIterator<Item = &'a str>,
        project_id: Option<i64>,
    ) -> bool {
        capabilities
            .into_iter()
            .any(|capability| self.can(capability, project_id))
    }

    /// Like [`JwtUser::can`], but failing with [`AuthError::Forbidden`].
    pub fn require(&self, capability: &str, project_id: Option<i64>) -> Result<(), AuthError> {
        if self.can(capability, project_id) {
            Ok(())
        } else {
            tracing::debug!(sub = self.id(), capability, project_id, "Capability check failed");
            Err(AuthError::Forbidden(self.normalize(capability).into_owned()))
        }
    }

    fn normalize<'a>(&self, capability: &'a str) -> Cow<'a, str> {
        match self.capability_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() && !capability.starts_with(prefix) => {
                Cow::Owned(format!("{prefix}{capability}"))
            }
            _ => Cow::Borrowed(capability),
        }
    }
}
