//! JWT payload segment and claim decoding.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use error::{DecodeError, EncodingError};
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::capabilities::Capabilities;
use crate::segment::{self, Segment};

/// Naive layouts tried after the zoned ones; interpreted as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// JWT claims.
///
/// Serializes as `{sub, name, email, ins, iat, exp, cap}` in that order with
/// timestamps as whole epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payload {
    /// Subject (user ID)
    #[serde(rename = "sub")]
    pub subject: i64,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Issuing instance (tenant) ID
    #[serde(rename = "ins")]
    pub instance: i64,
    /// Issued at
    #[serde(rename = "iat", serialize_with = "chrono::serde::ts_seconds::serialize")]
    pub issued_at: DateTime<Utc>,
    /// Expiration time
    #[serde(rename = "exp", serialize_with = "chrono::serde::ts_seconds::serialize")]
    pub expires_at: DateTime<Utc>,
    /// Granted capabilities
    #[serde(rename = "cap")]
    pub capabilities: Capabilities,
}

impl Payload {
    /// Create a payload without capabilities.
    pub fn new(
        subject: i64,
        name: impl Into<String>,
        email: impl Into<String>,
        instance: i64,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject,
            name: name.into(),
            email: email.into(),
            instance,
            issued_at,
            expires_at,
            capabilities: Capabilities::default(),
        }
    }

    /// Replace the capabilities.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Decode a base64url payload segment.
    pub fn decode(data: &str) -> Result<Self, DecodeError> {
        segment::decode_segment(data)
    }

    /// Encode to a base64url payload segment.
    pub fn encode(&self) -> Result<String, EncodingError> {
        segment::encode_segment(self)
    }
}

impl Segment for Payload {
    const NAME: &'static str = "Payload";

    fn from_fields(mut fields: Map<String, Value>) -> Result<Self, DecodeError> {
        let mut take = |field: &str| fields.remove(field).filter(|value| !value.is_null());
        let (Some(sub), Some(name), Some(email), Some(ins), Some(iat), Some(exp)) = (
            take("sub"),
            take("name"),
            take("email"),
            take("ins"),
            take("iat"),
            take("exp"),
        ) else {
            return Err(DecodeError::MissingPayloadFields);
        };

        let capabilities = match fields.remove("cap") {
            None | Some(Value::Null) => Capabilities::default(),
            Some(cap) => serde_json::from_value(cap)
                .map_err(|_| invalid("cap", "a list or map of capability identifiers"))?,
        };

        Ok(Self {
            subject: integer("sub", sub)?,
            name: string("name", name)?,
            email: string("email", email)?,
            instance: integer("ins", ins)?,
            issued_at: timestamp("iat", iat)?,
            expires_at: timestamp("exp", exp)?,
            capabilities,
        })
    }
}

fn invalid(field: &'static str, expected: &'static str) -> DecodeError {
    DecodeError::InvalidField {
        context: "payload",
        field,
        expected,
    }
}

/// Numbers and numeric strings, with any fraction truncated.
fn integer(field: &'static str, value: Value) -> Result<i64, DecodeError> {
    match &value {
        Value::Number(n) => whole_number(n),
        Value::String(s) => numeric(s),
        _ => None,
    }
    .ok_or_else(|| invalid(field, "an integer"))
}

fn string(field: &'static str, value: Value) -> Result<String, DecodeError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(invalid(field, "a string")),
    }
}

/// Numbers and numeric strings are epoch seconds; other strings are dates.
fn timestamp(field: &'static str, value: Value) -> Result<DateTime<Utc>, DecodeError> {
    let seconds = match &value {
        Value::Number(n) => whole_number(n),
        Value::String(s) => match numeric(s) {
            Some(seconds) => Some(seconds),
            None => return parse_date(s),
        },
        _ => None,
    };

    seconds
        .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
        .ok_or_else(|| invalid(field, "a Unix timestamp or a date string"))
}

fn whole_number(value: &Number) -> Option<i64> {
    value.as_i64().or_else(|| value.as_f64().and_then(truncated))
}

fn numeric(value: &str) -> Option<i64> {
    let value = value.trim();
    value
        .parse()
        .ok()
        .or_else(|| value.parse().ok().and_then(truncated))
}

fn truncated(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.trunc() as i64)
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, DecodeError> {
    let value = value.trim();
    let rfc3339_error = match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => return Ok(parsed.with_timezone(&Utc)),
        Err(err) => err,
    };

    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc2822(value))
    {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.from_utc_datetime(&parsed));
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    Err(DecodeError::InvalidDate(rfc3339_error))
}
