//! Test that authorizer faults surface only as a generic 500.

use axum::http::StatusCode;
use serde_json::json;

use crate::e2e_tests::helpers::*;

#[test]
fn test_fault_returns_generic_500() {
    let app = TestApp::new(Decision::Fail);

    let resp = app.get_env("dev", Some("dev123"));
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.body, json!({"error": "Internal server error."}));
    assert!(!resp.body.to_string().contains("pdp unavailable"));
    assert_eq!(app.checks().len(), 1);
}

#[test]
fn test_each_request_is_checked_once() {
    let app = TestApp::new(Decision::Fail);

    for _ in 0..3 {
        assert_eq!(
            app.get_env("staging", Some("dev123")).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
    // No retries.
    assert_eq!(app.checks().len(), 3);
}
