//! Test that denied requests get 403 and no configuration values.

use std::collections::HashSet;

use axum::http::StatusCode;

use crate::e2e_tests::helpers::*;

#[test]
fn test_denied_returns_403() {
    let app = TestApp::new(Decision::DenyAll);

    let resp = app.get_env("prod", Some("intruder"));
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(error_message(&resp), "Access Denied.");

    let body = resp.body.to_string();
    for value in ["prod.db.public", "prod789", "DB_HOST", "API_KEY"] {
        assert!(!body.contains(value), "body leaked {value}: {body}");
    }
}

#[test]
fn test_denied_subject_only() {
    let app = TestApp::new(Decision::AllowSubjects(HashSet::from(["alice".to_string()])));

    assert_eq!(app.get_env("dev", Some("alice")).status, StatusCode::OK);
    assert_eq!(app.get_env("dev", Some("bob")).status, StatusCode::FORBIDDEN);
}

#[test]
fn test_check_arguments() {
    let app = TestApp::new(Decision::DenyAll);

    app.get_env("dev", Some("k1"));
    app.get_env("staging", Some("k2"));
    app.get_env("prod", Some("k3"));

    let checks = app.checks();
    let seen: Vec<(&str, &str, &str)> = checks
        .iter()
        .map(|c| (c.subject.as_str(), c.action.as_str(), c.resource.as_str()))
        .collect();
    assert_eq!(
        seen,
        vec![
            ("k1", "read", "envdev"),
            ("k2", "read", "envstaging"),
            ("k3", "read", "envprod"),
        ]
    );
}
