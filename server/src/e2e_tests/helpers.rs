//! Common helpers for end-to-end tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{AuthorizationError, Authorizer, TokenCodec};
use crate::environment::EnvironmentTable;
use crate::router::{AppState, build_router};

pub const TEST_SECRET: &[u8] = b"e2e-test-secret";

/// How the stub authorizer answers.
#[derive(Debug, Clone)]
pub enum Decision {
    AllowAll,
    DenyAll,
    /// Allow only these subjects.
    AllowSubjects(HashSet<String>),
    /// Every check fails as if the PDP were unreachable.
    Fail,
}

/// A single `check` call seen by the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub subject: String,
    pub action: String,
    pub resource: String,
}

pub struct StubAuthorizer {
    decision: Decision,
    checks: Mutex<Vec<Check>>,
}

#[async_trait]
impl Authorizer for StubAuthorizer {
    async fn check(
        &self,
        subject: &str,
        action: &str,
        resource: &str,
    ) -> Result<bool, AuthorizationError> {
        self.checks.lock().expect("checks lock").push(Check {
            subject: subject.to_string(),
            action: action.to_string(),
            resource: resource.to_string(),
        });
        match &self.decision {
            Decision::AllowAll => Ok(true),
            Decision::DenyAll => Ok(false),
            Decision::AllowSubjects(subjects) => Ok(subjects.contains(subject)),
            Decision::Fail => Err(AuthorizationError::Other("pdp unavailable".to_string())),
        }
    }
}

/// Response status plus the parsed JSON body.
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// A router wired to a stub authorizer, with its own runtime.
pub struct TestApp {
    pub runtime: tokio::runtime::Runtime,
    router: Router,
    authorizer: Arc<StubAuthorizer>,
}

impl TestApp {
    /// Built-in environment table, authorizer answering with `decision`.
    #[must_use]
    pub fn new(decision: Decision) -> Self {
        Self::with_environments(decision, EnvironmentTable::builtin())
    }

    #[must_use]
    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
    pub fn with_environments(decision: Decision, environments: EnvironmentTable) -> Self {
        let authorizer = Arc::new(StubAuthorizer {
            decision,
            checks: Mutex::new(Vec::new()),
        });
        let tokens = TokenCodec::new(TEST_SECRET).expect("valid secret");
        let state = AppState::new(environments, tokens, Arc::clone(&authorizer) as Arc<dyn Authorizer>);

        Self {
            runtime: tokio::runtime::Runtime::new().expect("Failed to create runtime"),
            router: build_router(state),
            authorizer,
        }
    }

    /// A codec sharing the app's secret.
    #[must_use]
    pub fn codec() -> TokenCodec {
        TokenCodec::new(TEST_SECRET).expect("valid secret")
    }

    /// Send a request and return the response.
    pub fn send(&self, request: Request<Body>) -> TestResponse {
        self.runtime.block_on(async {
            let response = self
                .router
                .clone()
                .oneshot(request)
                .await
                .expect("router is infallible");
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("readable body");
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).expect("JSON body")
            };
            TestResponse { status, body }
        })
    }

    /// `GET /getEnv/{level}` with an optional `X-API-Key`.
    pub fn get_env(&self, level: &str, api_key: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().uri(format!("/getEnv/{level}"));
        if let Some(api_key) = api_key {
            builder = builder.header("X-API-Key", api_key);
        }
        self.send(builder.body(Body::empty()).expect("valid request"))
    }

    /// `POST /encodeApiKey` with a raw JSON body.
    pub fn encode_api_key(&self, body: &str) -> TestResponse {
        self.encode_api_key_as(Some("application/json"), body)
    }

    /// `POST /encodeApiKey` with an explicit (or no) `Content-Type`.
    pub fn encode_api_key_as(&self, content_type: Option<&str>, body: &str) -> TestResponse {
        let mut builder = Request::builder().method("POST").uri("/encodeApiKey");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        self.send(builder.body(Body::from(body.to_string())).expect("valid request"))
    }

    /// Checks the stub has seen so far.
    pub fn checks(&self) -> Vec<Check> {
        self.authorizer.checks.lock().expect("checks lock").clone()
    }
}

/// The `error` field of a JSON error body.
pub fn error_message(response: &TestResponse) -> &str {
    response.body["error"].as_str().expect("error body")
}
