//! Three-part token framing: `header.payload.signature`.

use std::str::FromStr;

use error::{DecodeError, EncodingError};
use serde::{Serialize, Serializer};

use crate::base64url;
use crate::header::Header;
use crate::payload::Payload;

/// A decoded JWT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub header: Header,
    pub payload: Payload,
    /// Raw signature bytes (not base64 text)
    pub signature: Vec<u8>,
}

impl Token {
    pub fn new(header: Header, payload: Payload, signature: impl Into<Vec<u8>>) -> Self {
        Self {
            header,
            payload,
            signature: signature.into(),
        }
    }

    /// Parse a compact token string.
    pub fn decode(data: &str) -> Result<Self, DecodeError> {
        let parts: Vec<&str> = data.split('.').collect();
        let [header, payload, signature] = parts.as_slice() else {
            return Err(DecodeError::InvalidFormat);
        };

        let header = Header::decode(header)?;
        let payload = Payload::decode(payload)?;
        let signature =
            base64url::decode(signature).map_err(|e| DecodeError::from(e).within("Signature"))?;

        Ok(Self {
            header,
            payload,
            signature,
        })
    }

    /// The `header.payload` text covered by the signature, re-encoded canonically.
    pub fn signing_input(&self) -> Result<String, EncodingError> {
        Ok(format!("{}.{}", self.header.encode()?, self.payload.encode()?))
    }

    /// Encode to the compact three-part form.
    pub fn encode(&self) -> Result<String, EncodingError> {
        Ok(format!(
            "{}.{}",
            self.signing_input()?,
            base64url::encode(&self.signature)
        ))
    }
}

impl FromStr for Token {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// A token serializes as its compact string form.
impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let encoded = self.encode().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&encoded)
    }
}
