//! Authentication for services that accept HS256 bearer tokens.
//!
//! [`AuthConfig`] builds a [`JwtGuard`] around one shared validator; the guard
//! turns an `Authorization` header into a [`JwtUser`] with capability checks.

mod config;
mod guard;
mod user;

pub use config::{AuthConfig, CAPABILITY_PREFIX_ENV, SECRET_ENV};
pub use guard::{bearer_token, JwtGuard};
pub use user::JwtUser;
