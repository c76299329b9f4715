//! Test that tokens in `X-API-Key` are checked with the API key they carry,
//! and that undecodable tokens fall back to the raw header value.

use std::collections::HashSet;

use axum::http::StatusCode;

use crate::auth::TokenCodec;
use crate::auth::token::TOKEN_TTL_SECS;
use crate::e2e_tests::helpers::*;

#[test]
fn test_token_from_encode_endpoint_grants_access() {
    let app = TestApp::new(Decision::AllowSubjects(HashSet::from(["dev123".to_string()])));

    let resp = app.encode_api_key(r#"{"apiKey": "dev123"}"#);
    let token = resp.body["token"].as_str().expect("token string").to_string();

    let resp = app.get_env("dev", Some(&token));
    assert_eq!(resp.status, StatusCode::OK);

    let checks = app.checks();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].subject, "dev123");
}

#[test]
fn test_expired_token_uses_raw_value() {
    let app = TestApp::new(Decision::AllowSubjects(HashSet::from(["dev123".to_string()])));
    let issued_at = jsonwebtoken::get_current_timestamp() - TOKEN_TTL_SECS - 3_600;
    let token = TestApp::codec()
        .encode_at("dev123", issued_at)
        .expect("signing succeeds");

    let resp = app.get_env("dev", Some(&token));
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(app.checks()[0].subject, token);
}

#[test]
fn test_foreign_token_uses_raw_value() {
    let app = TestApp::new(Decision::DenyAll);
    let token = TokenCodec::new(b"another-secret")
        .expect("valid secret")
        .encode("dev123")
        .expect("signing succeeds");

    let resp = app.get_env("dev", Some(&token));
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(app.checks()[0].subject, token);
}

#[test]
fn test_token_for_empty_key_is_missing() {
    let app = TestApp::new(Decision::AllowAll);
    let token = TestApp::codec().encode("").expect("signing succeeds");

    let resp = app.get_env("dev", Some(&token));
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}
