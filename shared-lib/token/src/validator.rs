//! HS256 token validation.

use std::fmt;

use chrono::{DateTime, Utc};
use error::{ConfigurationError, DecodeError, EncodingError, ValidationError};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::header::{ALGORITHM, TOKEN_TYPE};
use crate::token::Token;

type HmacSha256 = Hmac<Sha256>;

/// Verifies tokens signed with a single shared secret.
///
/// Holds the keyed MAC state only; construct once at startup and share.
#[derive(Clone)]
pub struct TokenValidator {
    mac: HmacSha256,
}

impl TokenValidator {
    /// Create a validator. An empty secret is rejected.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, ConfigurationError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(ConfigurationError::EmptySecret);
        }

        let mac = HmacSha256::new_from_slice(secret).map_err(|e| {
            tracing::error!("Failed to create HMAC key: {}", e);
            ConfigurationError::InvalidSecret(e.to_string())
        })?;

        Ok(Self { mac })
    }

    /// Decode a token without validating it.
    pub fn parse(&self, data: &str) -> Result<Token, DecodeError> {
        Token::decode(data)
    }

    /// Recompute the signature over the canonical `header.payload` text and
    /// compare it in constant time.
    pub fn try_validate_signature(&self, token: &Token) -> Result<bool, EncodingError> {
        let signing_input = token.signing_input()?;

        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        Ok(mac.verify_slice(&token.signature).is_ok())
    }

    /// Signature check. An encoding fault is logged and counts as a mismatch.
    pub fn validate_signature(&self, token: &Token) -> bool {
        self.try_validate_signature(token).unwrap_or_else(|e| {
            tracing::error!("Error encoding JWT for signature validation: {}", e);
            false
        })
    }

    /// Accept only `alg = HS256` and `typ = JWT`.
    pub fn validate_header(&self, token: &Token) -> bool {
        token.header.algorithm == ALGORITHM && token.header.token_type == TOKEN_TYPE
    }

    /// Expiration check against the current time.
    pub fn validate_expiration(&self, token: &Token) -> bool {
        self.validate_expiration_at(token, Utc::now())
    }

    /// Expiration check against `now`. A token expiring exactly at `now` is valid.
    pub fn validate_expiration_at(&self, token: &Token, now: DateTime<Utc>) -> bool {
        token.payload.expires_at >= now
    }

    /// Decode and fully validate a token.
    ///
    /// Checks run in order (signature, header, expiration) and the first
    /// failure is returned.
    pub fn parse_and_validate(&self, data: &str) -> error::Result<Token> {
        let now = Utc::now();
        let token = self.parse(data)?;

        if !self.try_validate_signature(&token)? {
            tracing::warn!(sub = token.payload.subject, "Rejected JWT with invalid signature");
            return Err(ValidationError::InvalidSignature.into());
        }

        if !self.validate_header(&token) {
            tracing::debug!(
                alg = %token.header.algorithm,
                typ = %token.header.token_type,
                "Rejected JWT with unsupported header"
            );
            return Err(ValidationError::InvalidHeader.into());
        }

        if !self.validate_expiration_at(&token, now) {
            tracing::debug!(
                sub = token.payload.subject,
                exp = token.payload.expires_at.timestamp(),
                "Rejected expired JWT"
            );
            return Err(ValidationError::Expired.into());
        }

        Ok(token)
    }
}

impl fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenValidator")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base64url;
    use crate::header::Header;
    use crate::payload::Payload;
    use chrono::Duration;
    use error::TokenError;

    const SECRET: &str = "test-secret-key";

    fn at(seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(seconds, 0).unwrap()
    }

    /// Build a token whose signature is computed with `secret`.
    fn signed(header: Header, payload: Payload, secret: &str) -> Token {
        let unsigned = Token::new(header, payload, Vec::new());
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(unsigned.signing_input().unwrap().as_bytes());
        Token::new(
            unsigned.header,
            unsigned.payload,
            mac.finalize().into_bytes().to_vec(),
        )
    }

    fn payload(expires_at: DateTime<Utc>) -> Payload {
        Payload::new(7, "Test User", "test@example.com", 2, at(1_700_000_000), expires_at)
    }

    #[test]
    fn test_empty_secret_rejected() {
        let err = TokenValidator::new("").unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptySecret));
        assert_eq!(err.to_string(), "JWT secret must not be empty");
    }

    #[test]
    fn test_debug_hides_secret() {
        let validator = TokenValidator::new(SECRET).unwrap();
        assert!(!format!("{validator:?}").contains(SECRET));
    }

    #[test]
    fn test_valid_token() {
        let validator = TokenValidator::new(SECRET).unwrap();
        let exp = at(Utc::now().timestamp() + 3600);
        let token = signed(Header::default(), payload(exp), SECRET);

        assert!(validator.validate_signature(&token));
        assert!(validator.validate_header(&token));
        assert!(validator.validate_expiration(&token));

        let validated = validator.parse_and_validate(&token.encode().unwrap()).unwrap();
        assert_eq!(validated.payload.subject, 7);
        assert_eq!(validated, token);
    }

    #[test]
    fn test_wrong_secret() {
        let validator = TokenValidator::new(SECRET).unwrap();
        let token = signed(Header::default(), payload(at(4_000_000_000)), "other-secret");

        assert!(!validator.validate_signature(&token));
        let err = validator.parse_and_validate(&token.encode().unwrap()).unwrap_err();
        assert!(matches!(err, TokenError::Validation(ValidationError::InvalidSignature)));
    }

    #[test]
    fn test_tampered_payload() {
        let validator = TokenValidator::new(SECRET).unwrap();
        let mut token = signed(Header::default(), payload(at(4_000_000_000)), SECRET);
        assert!(validator.validate_signature(&token));

        token.payload.name.push('!');
        assert!(!validator.validate_signature(&token));

        token.payload.name.pop();
        token.signature[0] ^= 0x01;
        assert!(!validator.validate_signature(&token));
    }

    #[test]
    fn test_truncated_signature() {
        let validator = TokenValidator::new(SECRET).unwrap();
        let mut token = signed(Header::default(), payload(at(4_000_000_000)), SECRET);
        token.signature.truncate(16);
        assert!(!validator.validate_signature(&token));
    }

    #[test]
    fn test_invalid_header_with_valid_signature() {
        let validator = TokenValidator::new(SECRET).unwrap();
        for header in [Header::new("UNKNOWN", "JWT"), Header::new("HS256", "JWS")] {
            let token = signed(header, payload(at(4_000_000_000)), SECRET);
            assert!(validator.validate_signature(&token));
            assert!(!validator.validate_header(&token));

            let err = validator.parse_and_validate(&token.encode().unwrap()).unwrap_err();
            assert_eq!(err.to_string(), "Invalid JWT header");
        }
    }

    #[test]
    fn test_signature_checked_before_header() {
        let validator = TokenValidator::new(SECRET).unwrap();
        let token = signed(Header::new("none", "JWT"), payload(at(0)), "forged");

        let err = validator.parse_and_validate(&token.encode().unwrap()).unwrap_err();
        assert_eq!(err.kind(), "signature");
    }

    #[test]
    fn test_expiration_boundary() {
        let validator = TokenValidator::new(SECRET).unwrap();
        let exp = at(1_800_000_000);
        let token = signed(Header::default(), payload(exp), SECRET);

        assert!(validator.validate_expiration_at(&token, exp));
        assert!(validator.validate_expiration_at(&token, exp - Duration::seconds(1)));
        assert!(!validator.validate_expiration_at(&token, exp + Duration::seconds(1)));
    }

    #[test]
    fn test_expired_token() {
        let validator = TokenValidator::new(SECRET).unwrap();
        let token = signed(Header::default(), payload(at(963_834_885)), SECRET);

        assert!(validator.validate_signature(&token));
        assert!(!validator.validate_expiration(&token));

        let err = validator.parse_and_validate(&token.encode().unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "JWT token has expired");
    }

    #[test]
    fn test_scoped_capabilities_keep_signature() {
        let validator = TokenValidator::new(SECRET).unwrap();
        for cap in [
            r#"{"client":["app.read-model"],"12":["app.admin-model"]}"#,
            r#"{"42":["app.admin-model"],"client":["app.read-model"]}"#,
        ] {
            let header = base64url::encode(r#"{"alg":"HS256","typ":"JWT"}"#);
            let payload = base64url::encode(format!(
                r#"{{"sub":7,"name":"n","email":"e","ins":2,"iat":1700000000,"exp":4000000000,"cap":{cap}}}"#
            ));
            let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
            mac.update(format!("{header}.{payload}").as_bytes());
            let signature = base64url::encode(mac.finalize().into_bytes());
            let compact = format!("{header}.{payload}.{signature}");

            let token = validator.parse(&compact).unwrap();
            assert!(validator.validate_signature(&token));
            assert_eq!(token.encode().unwrap(), compact);
            assert!(validator.parse_and_validate(&compact).is_ok());
        }
    }

    #[test]
    fn test_parse_errors_surface_unclassified() {
        let validator = TokenValidator::new(SECRET).unwrap();
        let err = validator.parse_and_validate("not-a-token").unwrap_err();
        assert!(matches!(err, TokenError::Decode(DecodeError::InvalidFormat)));

        let bad_signature = format!(
            "{}.{}.%%%",
            Header::default().encode().unwrap(),
            payload(at(4_000_000_000)).encode().unwrap()
        );
        let err = validator.parse_and_validate(&bad_signature).unwrap_err();
        assert_eq!(err.kind(), "decode");
        assert!(err.to_string().starts_with("Cannot decode Signature"));
        assert!(base64url::decode("%%%").is_err());
    }

    #[test]
    fn test_validator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TokenValidator>();
    }
}
