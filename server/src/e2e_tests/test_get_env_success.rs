//! Test that allowed requests return exactly the level's variables.

use axum::http::StatusCode;
use serde_json::json;

use crate::e2e_tests::helpers::*;

#[test]
fn test_dev_variables() {
    let app = TestApp::new(Decision::AllowAll);

    let resp = app.get_env("dev", Some("dev123"));
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, json!({"DB_HOST": "dev.db.local", "API_KEY": "dev123"}));
}

#[test]
fn test_every_level() {
    let app = TestApp::new(Decision::AllowAll);

    let expected = [
        ("dev", json!({"DB_HOST": "dev.db.local", "API_KEY": "dev123"})),
        ("staging", json!({"DB_HOST": "staging.db.internal", "API_KEY": "staging456"})),
        ("prod", json!({"DB_HOST": "prod.db.public", "API_KEY": "prod789"})),
    ];
    for (level, body) in expected {
        let resp = app.get_env(level, Some("any-key"));
        assert_eq!(resp.status, StatusCode::OK, "level {level}");
        assert_eq!(resp.body, body, "level {level}");
    }
}
