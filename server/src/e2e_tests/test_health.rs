//! Test the health endpoint.

use axum::{body::Body, http::{Request, StatusCode}};
use serde_json::json;

use crate::e2e_tests::helpers::*;

#[test]
fn test_health_ok() {
    let app = TestApp::new(Decision::DenyAll);

    let resp = app.send(Request::builder().uri("/").body(Body::empty()).expect("valid request"));
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.body,
        json!({"status": "ok", "message": "Env Var Hosting Service Demo running."})
    );
    assert!(app.checks().is_empty());
}

#[test]
fn test_unknown_route() {
    let app = TestApp::new(Decision::AllowAll);

    let resp = app.send(Request::builder().uri("/nope").body(Body::empty()).expect("valid request"));
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
