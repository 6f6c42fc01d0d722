//! JWT header segment.

use error::{DecodeError, EncodingError};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::segment::{self, Segment};

/// The only algorithm accepted by the validator.
pub const ALGORITHM: &str = "HS256";

/// The only token type accepted by the validator.
pub const TOKEN_TYPE: &str = "JWT";

/// JWT header. Serializes as `{"alg":..,"typ":..}` in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// Signing algorithm (`alg`)
    #[serde(rename = "alg")]
    pub algorithm: String,
    /// Token type (`typ`)
    #[serde(rename = "typ")]
    pub token_type: String,
}

impl Header {
    /// Create a header with explicit values.
    pub fn new(algorithm: impl Into<String>, token_type: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            token_type: token_type.into(),
        }
    }

    /// Decode a base64url header segment.
    pub fn decode(data: &str) -> Result<Self, DecodeError> {
        segment::decode_segment(data)
    }

    /// Encode to a base64url header segment.
    pub fn encode(&self) -> Result<String, EncodingError> {
        segment::encode_segment(self)
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new(ALGORITHM, TOKEN_TYPE)
    }
}

impl Segment for Header {
    const NAME: &'static str = "Header";

    fn from_fields(mut fields: Map<String, Value>) -> Result<Self, DecodeError> {
        let mut take = |field: &'static str| match fields.remove(field) {
            None | Some(Value::Null) => Err(DecodeError::MissingHeaderField(field)),
            Some(Value::String(value)) => Ok(value),
            Some(_) => Err(DecodeError::InvalidField {
                context: "header",
                field,
                expected: "a string",
            }),
        };

        let algorithm = take("alg")?;
        let token_type = take("typ")?;
        Ok(Self {
            algorithm,
            token_type,
        })
    }
}
