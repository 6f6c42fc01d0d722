//! Capability identifiers carried in the `cap` claim.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Scope key for capabilities that apply regardless of project.
pub const CLIENT_SCOPE: &str = "client";

/// The `cap` claim.
///
/// Issuers emit either an object keyed by scope (`"client"` or a numeric
/// project id) or, when no scope keys are used, a bare list. A scope map
/// whose keys are exactly `"0"`, `"1"`, ... is emitted as a list of lists.
/// The shape is kept as decoded so the payload re-encodes to the bytes that
/// were signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Capabilities {
    /// Bare list of identifiers without scope keys
    Unscoped(Vec<String>),
    /// Identifiers grouped by project id `0..n`, by position
    Indexed(Vec<Vec<String>>),
    /// Identifiers grouped by scope key, in issuer order
    Scoped(IndexMap<String, Vec<String>>),
}

impl Capabilities {
    /// Build a scoped capability map.
    pub fn scoped<K, I, S>(scopes: impl IntoIterator<Item = (K, I)>) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Scoped(
            scopes
                .into_iter()
                .map(|(key, caps)| (key.into(), caps.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }

    /// Identifiers granted under a scope key. An unscoped list has no scopes.
    pub fn scope(&self, key: &str) -> Option<&[String]> {
        match self {
            Self::Scoped(scopes) => scopes.get(key).map(Vec::as_slice),
            Self::Indexed(scopes) => key
                .parse::<usize>()
                .ok()
                .filter(|index| index.to_string() == key)
                .and_then(|index| scopes.get(index))
                .map(Vec::as_slice),
            Self::Unscoped(_) => None,
        }
    }

    /// Check whether `capability` is granted under the scope `key`.
    pub fn contains(&self, key: &str, capability: &str) -> bool {
        self.scope(key)
            .is_some_and(|caps| caps.iter().any(|c| c == capability))
    }

    /// True when no identifiers are present at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Unscoped(caps) => caps.is_empty(),
            Self::Indexed(scopes) => scopes.iter().all(Vec::is_empty),
            Self::Scoped(scopes) => scopes.values().all(Vec::is_empty),
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::Unscoped(Vec::new())
    }
}
