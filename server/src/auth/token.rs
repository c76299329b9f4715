//! API key token codec.
//!
//! Wraps an API key in an HS256 JWT that expires after 24 hours, and unwraps
//! it again.
//!
//! # Pre-conditions
//! - The signing secret must be non-empty.
//!
//! # Post-conditions
//! - [`TokenCodec::decode`] returns the embedded API key only for a token that
//!   was signed with the same secret, uses HS256 and has not expired.
//!
//! # Invariants
//! - Verification is stateless; nothing about issued tokens is stored.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Claims carried by an API key token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "apiKey")]
    api_key: String,
    iat: u64,
    exp: u64,
}

/// Error returned when encoding or verifying a token fails.
#[derive(Debug)]
pub enum TokenError {
    /// The JWT signature is invalid.
    InvalidSignature,
    /// The JWT has expired.
    TokenExpired,
    /// The JWT is malformed, uses another algorithm, or lacks the `apiKey` claim.
    MalformedToken,
    /// The signing secret is empty.
    EmptySecret,
    /// Signing failed.
    Encoding(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "invalid JWT signature"),
            Self::TokenExpired => write!(f, "JWT has expired"),
            Self::MalformedToken => write!(f, "malformed JWT"),
            Self::EmptySecret => write!(f, "JWT secret must not be empty"),
            Self::Encoding(reason) => write!(f, "failed to sign JWT: {reason}"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Signs and verifies API key tokens with a process-wide secret.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec for the given HS256 secret.
    ///
    /// # Errors
    /// Returns `TokenError::EmptySecret` if the secret is empty.
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        // Expiry is exact: no grace period past the 24 hour window.
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Wrap an API key in a token valid for [`TOKEN_TTL_SECS`] from now.
    pub fn encode(&self, api_key: &str) -> Result<String, TokenError> {
        self.encode_at(api_key, jsonwebtoken::get_current_timestamp())
    }

    /// Wrap an API key in a token issued at `issued_at` (unix seconds).
    pub fn encode_at(&self, api_key: &str, issued_at: u64) -> Result<String, TokenError> {
        let claims = Claims {
            api_key: api_key.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(TOKEN_TTL_SECS),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify a token and return the API key it carries.
    ///
    /// # Errors
    /// Returns `TokenError` describing why the token was rejected.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?;
        Ok(data.claims.api_key)
    }

    /// Verify a token, collapsing every failure to `None`.
    #[must_use]
    pub fn decode(&self, token: &str) -> Option<String> {
        match self.verify(token) {
            Ok(api_key) => Some(api_key),
            Err(e) => {
                tracing::trace!("token not decoded: {e}");
                None
            }
        }
    }
}

/// Maps jsonwebtoken errors to our `TokenError` type.
fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::TokenExpired,
        _ => TokenError::MalformedToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-that-is-long-enough";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET).expect("valid secret")
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();
        for api_key in ["abc", "user-123", "key with spaces", "ключ", "a.b.c"] {
            let token = codec.encode(api_key).expect("signing succeeds");
            assert_eq!(codec.decode(&token).as_deref(), Some(api_key));
        }
    }

    #[test]
    fn test_token_is_a_jwt() {
        let token = codec().encode("abc").expect("signing succeeds");
        assert_eq!(token.split('.').count(), 3);
        assert_ne!(token, "abc");
    }

    #[test]
    fn test_expiry_is_24_hours() {
        let codec = codec();
        let token = codec.encode_at("abc", 1_000).expect("signing succeeds");

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let data = decode::<Claims>(&token, &DecodingKey::from_secret(SECRET), &validation)
            .expect("decodable");
        assert_eq!(data.claims.iat, 1_000);
        assert_eq!(data.claims.exp, 1_000 + 86_400);
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let issued_at = jsonwebtoken::get_current_timestamp() - TOKEN_TTL_SECS - 3_600;
        let token = codec.encode_at("abc", issued_at).expect("signing succeeds");

        assert!(matches!(codec.verify(&token), Err(TokenError::TokenExpired)));
        assert_eq!(codec.decode(&token), None);
    }

    #[test]
    fn test_token_expired_seconds_ago() {
        let codec = codec();
        let issued_at = jsonwebtoken::get_current_timestamp() - TOKEN_TTL_SECS - 30;
        let token = codec.encode_at("abc", issued_at).expect("signing succeeds");

        assert!(matches!(codec.verify(&token), Err(TokenError::TokenExpired)));
        assert_eq!(codec.decode(&token), None);
    }

    #[test]
    fn test_token_near_end_of_window_is_valid() {
        let codec = codec();
        let issued_at = jsonwebtoken::get_current_timestamp() - TOKEN_TTL_SECS + 3_600;
        let token = codec.encode_at("abc", issued_at).expect("signing succeeds");
        assert_eq!(codec.decode(&token).as_deref(), Some("abc"));
    }

    #[test]
    fn test_wrong_secret() {
        let token = codec().encode("abc").expect("signing succeeds");
        let other = TokenCodec::new(b"wrong-secret-key-that-is-different").expect("valid secret");

        assert!(matches!(other.verify(&token), Err(TokenError::InvalidSignature)));
        assert_eq!(other.decode(&token), None);
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = codec();
        for token in ["", "abc", "not-a-valid-jwt", "a.b.c", "dev123"] {
            assert!(
                matches!(codec.verify(token), Err(TokenError::MalformedToken)),
                "{token:?} should be malformed"
            );
            assert_eq!(codec.decode(token), None);
        }
    }

    #[test]
    fn test_token_without_api_key_claim() {
        #[derive(Serialize)]
        struct SubOnly {
            sub: String,
            exp: u64,
        }
        let claims = SubOnly {
            sub: "user-123".to_string(),
            exp: jsonwebtoken::get_current_timestamp() + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("signing succeeds");

        assert!(matches!(codec().verify(&token), Err(TokenError::MalformedToken)));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let claims = Claims {
            api_key: "abc".to_string(),
            iat: jsonwebtoken::get_current_timestamp(),
            exp: jsonwebtoken::get_current_timestamp() + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("signing succeeds");

        assert!(codec().verify(&token).is_err());
        assert_eq!(codec().decode(&token), None);
    }

    #[test]
    fn test_empty_secret() {
        assert!(matches!(TokenCodec::new(b""), Err(TokenError::EmptySecret)));
    }

    #[test]
    fn test_token_error_display() {
        assert_eq!(TokenError::InvalidSignature.to_string(), "invalid JWT signature");
        assert_eq!(TokenError::TokenExpired.to_string(), "JWT has expired");
        assert_eq!(TokenError::MalformedToken.to_string(), "malformed JWT");
        assert_eq!(TokenError::EmptySecret.to_string(), "JWT secret must not be empty");
        assert_eq!(
            TokenError::Encoding("boom".to_string()).to_string(),
            "failed to sign JWT: boom"
        );
    }
}
