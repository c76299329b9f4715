//! Test that requests without a usable API key are rejected with 401.

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode},
};

use crate::e2e_tests::helpers::*;

#[test]
fn test_missing_header() {
    let app = TestApp::new(Decision::AllowAll);

    for level in ["dev", "staging", "prod"] {
        let resp = app.get_env(level, None);
        assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error_message(&resp), "API Key required.");
    }
    assert!(app.checks().is_empty());
}

#[test]
fn test_empty_header() {
    let app = TestApp::new(Decision::AllowAll);

    let resp = app.get_env("dev", Some(""));
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert!(app.checks().is_empty());
}

#[test]
fn test_utf8_header_reaches_authorizer() {
    let app = TestApp::new(Decision::AllowAll);

    let value = HeaderValue::from_bytes("ключ".as_bytes()).expect("obs-text header value");
    let request = Request::builder()
        .uri("/getEnv/dev")
        .header("X-API-Key", value)
        .body(Body::empty())
        .expect("valid request");

    let resp = app.send(request);
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(app.checks()[0].subject, "ключ");
}

#[test]
fn test_non_utf8_header_is_read_as_latin1() {
    let app = TestApp::new(Decision::DenyAll);

    let value = HeaderValue::from_bytes(b"key\xff\xfe").expect("obs-text header value");
    let request = Request::builder()
        .uri("/getEnv/dev")
        .header("X-API-Key", value)
        .body(Body::empty())
        .expect("valid request");

    let resp = app.send(request);
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(app.checks()[0].subject, "key\u{ff}\u{fe}");
}

#[test]
fn test_header_name_is_case_insensitive() {
    let app = TestApp::new(Decision::AllowAll);

    let request = Request::builder()
        .uri("/getEnv/dev")
        .header("x-api-key", "dev123")
        .body(Body::empty())
        .expect("valid request");

    let resp = app.send(request);
    assert_eq!(resp.status, StatusCode::OK);
}
