//! HS256 JSON Web Tokens.
//!
//! Decodes compact tokens into [`Header`], [`Payload`] and signature bytes,
//! re-encodes them canonically and validates them with a shared secret via
//! [`TokenValidator`].

pub mod base64url;
mod capabilities;
mod header;
mod payload;
mod segment;
mod token;
mod validator;

pub use capabilities::{Capabilities, CLIENT_SCOPE};
pub use header::{Header, ALGORITHM, TOKEN_TYPE};
pub use payload::Payload;
pub use segment::{decode_segment, encode_segment, Segment};
pub use token::Token;
pub use validator::TokenValidator;

pub use error::{ConfigurationError, DecodeError, EncodingError, TokenError, ValidationError};
