//! Test that an allowed request for a level with no variables is a server error.

use axum::http::StatusCode;

use crate::e2e_tests::helpers::*;
use crate::environment::{EnvironmentLevel, EnvironmentTable};

#[test]
fn test_missing_set_returns_500() {
    let environments = EnvironmentTable::from_entries([(
        EnvironmentLevel::Dev,
        vec![("DB_HOST", "dev.db.local")],
    )]);
    let app = TestApp::with_environments(Decision::AllowAll, environments);

    let resp = app.get_env("prod", Some("dev123"));
    assert_eq!(resp.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(&resp), "Server configuration error.");

    let resp = app.get_env("dev", Some("dev123"));
    assert_eq!(resp.status, StatusCode::OK);
}

#[test]
fn test_denied_before_configuration_lookup() {
    let app = TestApp::with_environments(Decision::DenyAll, EnvironmentTable::default());

    let resp = app.get_env("dev", Some("dev123"));
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}
