//! Resolution of the `X-API-Key` header into a credential.
//!
//! The header may carry either a raw API key or a token produced by
//! [`TokenCodec::encode`]. Decoding is attempted first; when it fails the raw
//! header value is used unchanged. A failed decode is not an error.

use super::TokenCodec;

/// Where the credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedCredential {
    /// The header held a valid token; this is the API key inside it.
    DecodedToken(String),
    /// The header value is used as-is.
    RawValue(String),
}

impl ResolvedCredential {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::DecodedToken(value) | Self::RawValue(value) => value,
        }
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        match self {
            Self::DecodedToken(value) | Self::RawValue(value) => value,
        }
    }

    #[must_use]
    pub const fn is_decoded(&self) -> bool {
        matches!(self, Self::DecodedToken(_))
    }
}

/// Resolve a header value. Returns `None` when there is no usable credential.
///
/// Empty values, and tokens that decode to an empty API key, count as absent.
#[must_use]
pub fn resolve_credential(header: Option<&str>, codec: &TokenCodec) -> Option<ResolvedCredential> {
    let raw = header?;
    let resolved = codec.decode(raw).map_or_else(
        || ResolvedCredential::RawValue(raw.to_string()),
        ResolvedCredential::DecodedToken,
    );

    if resolved.as_str().is_empty() {
        return None;
    }
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::TOKEN_TTL_SECS;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"credential-test-secret").expect("valid secret")
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(resolve_credential(None, &codec()), None);
    }

    #[test]
    fn test_empty_header() {
        assert_eq!(resolve_credential(Some(""), &codec()), None);
    }

    #[test]
    fn test_raw_value_fallback() {
        let resolved = resolve_credential(Some("dev123"), &codec()).expect("credential");
        assert_eq!(resolved, ResolvedCredential::RawValue("dev123".to_string()));
        assert!(!resolved.is_decoded());
    }

    #[test]
    fn test_decoded_token() {
        let codec = codec();
        let token = codec.encode("dev123").expect("signing succeeds");

        let resolved = resolve_credential(Some(&token), &codec).expect("credential");
        assert_eq!(resolved, ResolvedCredential::DecodedToken("dev123".to_string()));
        assert!(resolved.is_decoded());
        assert_eq!(resolved.as_str(), "dev123");
    }

    #[test]
    fn test_expired_token_falls_back_to_raw_value() {
        let codec = codec();
        let issued_at = jsonwebtoken::get_current_timestamp() - 2 * TOKEN_TTL_SECS;
        let token = codec.encode_at("dev123", issued_at).expect("signing succeeds");

        let resolved = resolve_credential(Some(&token), &codec).expect("credential");
        assert_eq!(resolved, ResolvedCredential::RawValue(token));
    }

    #[test]
    fn test_foreign_token_falls_back_to_raw_value() {
        let foreign = TokenCodec::new(b"some-other-secret").expect("valid secret");
        let token = foreign.encode("dev123").expect("signing succeeds");

        let resolved = resolve_credential(Some(&token), &codec()).expect("credential");
        assert_eq!(resolved.into_inner(), token);
    }

    #[test]
    fn test_token_with_empty_api_key_is_absent() {
        let codec = codec();
        let token = codec.encode("").expect("signing succeeds");
        assert_eq!(resolve_credential(Some(&token), &codec), None);
    }
}
