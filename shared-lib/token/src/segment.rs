//! Shared base64url + JSON framing for the header and payload segments.

use std::io;

use error::{DecodeError, EncodingError};
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};

use crate::base64url;

/// A JSON object carried as one dot-separated part of a token.
pub trait Segment: Serialize + Sized {
    /// Component name used in decode error messages.
    const NAME: &'static str;

    /// Build the value from the decoded JSON object.
    fn from_fields(fields: Map<String, Value>) -> Result<Self, DecodeError>;
}

/// Decode a base64url JSON segment, wrapping any failure with the segment name.
pub fn decode_segment<T: Segment>(data: &str) -> Result<T, DecodeError> {
    let decode = || -> Result<T, DecodeError> {
        let bytes = base64url::decode(data)?;
        match serde_json::from_slice::<Value>(&bytes)? {
            Value::Object(fields) => T::from_fields(fields),
            _ => Err(DecodeError::NotAnObject),
        }
    };

    decode().map_err(|e| e.within(T::NAME))
}

/// Serialize a segment to canonical JSON and base64url-encode it.
pub fn encode_segment<T: Segment>(value: &T) -> Result<String, EncodingError> {
    let json = to_canonical_json(value).map_err(|source| EncodingError::Json {
        component: T::NAME,
        source,
    })?;
    Ok(base64url::encode(json))
}

pub(crate) fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, CanonicalFormatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Compact JSON that escapes `/` and writes non-ASCII text as `\uXXXX`,
/// matching the output of the issuing side byte for byte.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '/' {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            if ch == '/' {
                writer.write_all(b"\\/")?;
            } else {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}
