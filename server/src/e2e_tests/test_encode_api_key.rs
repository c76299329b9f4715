//! Test the token issuance endpoint.

use axum::http::StatusCode;

use crate::e2e_tests::helpers::*;

#[test]
fn test_encode_returns_decodable_token() {
    let app = TestApp::new(Decision::DenyAll);

    let resp = app.encode_api_key(r#"{"apiKey": "abc"}"#);
    assert_eq!(resp.status, StatusCode::OK);

    let token = resp.body["token"].as_str().expect("token string");
    assert_eq!(TestApp::codec().decode(token).as_deref(), Some("abc"));
    // Issuance is not gated by the authorizer.
    assert!(app.checks().is_empty());
}

#[test]
fn test_encode_rejects_bad_bodies() {
    let app = TestApp::new(Decision::AllowAll);

    for body in [
        "{}",
        r#"{"apiKey": 123}"#,
        r#"{"apiKey": null}"#,
        r#"{"apiKey": ["abc"]}"#,
        r#"{"apiKey": ""}"#,
        r#"{"api_key": "abc"}"#,
        r#""abc""#,
        "not json",
        "",
    ] {
        let resp = app.encode_api_key(body);
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "body {body:?}");
        assert_eq!(
            error_message(&resp),
            "apiKey (string) is required in request body."
        );
    }
}

#[test]
fn test_encode_ignores_extra_fields() {
    let app = TestApp::new(Decision::AllowAll);

    let resp = app.encode_api_key(r#"{"apiKey": "abc", "level": "prod"}"#);
    assert_eq!(resp.status, StatusCode::OK);
}

#[test]
fn test_encode_requires_json_content_type() {
    let app = TestApp::new(Decision::AllowAll);
    let body = r#"{"apiKey": "abc"}"#;

    for content_type in [Some("text/plain"), Some("application/x-www-form-urlencoded"), None] {
        let resp = app.encode_api_key_as(content_type, body);
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "content type {content_type:?}");
        assert_eq!(
            error_message(&resp),
            "apiKey (string) is required in request body."
        );
    }

    let resp = app.encode_api_key_as(Some("application/json; charset=utf-8"), body);
    assert_eq!(resp.status, StatusCode::OK);
}
