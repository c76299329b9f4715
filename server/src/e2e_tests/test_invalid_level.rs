//! Test that unknown environment levels are rejected before anything else.

use axum::http::StatusCode;

use crate::e2e_tests::helpers::*;

#[test]
fn test_invalid_levels_rejected() {
    let app = TestApp::new(Decision::AllowAll);

    for level in ["test", "production", "Dev", "PROD", "qa", "dev%20", "123"] {
        let resp = app.get_env(level, Some("dev123"));
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "level {level:?}");
        assert_eq!(
            error_message(&resp),
            "Invalid environment level specified. Use 'dev', 'staging', or 'prod'."
        );
    }

    assert!(app.checks().is_empty());
}

#[test]
fn test_invalid_level_checked_before_api_key() {
    let app = TestApp::new(Decision::AllowAll);

    let resp = app.get_env("qa", None);
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}
