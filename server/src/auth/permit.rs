//! Authorization checks against a policy decision point.
//!
//! The handler only sees the [`Authorizer`] trait. [`PermitClient`] is the
//! production implementation, talking to a Permit.io PDP over HTTP.
//!
//! # Post-conditions
//! - `check` returns `Ok(decision)` only when the PDP answered with a 2xx
//!   status and a body carrying a boolean `allow`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Tenant every resource is checked in.
pub const DEFAULT_TENANT: &str = "default";

/// Error returned when an authorization decision could not be obtained.
#[derive(Debug)]
pub enum AuthorizationError {
    /// The request did not complete.
    Request(reqwest::Error),
    /// The PDP answered with a non-success status.
    Status { status: u16, body: String },
    /// The PDP response could not be parsed.
    Parse { body: String, error: serde_json::Error },
    /// Any other failure, mainly for substitute implementations.
    Other(String),
}

impl std::fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request(e) => write!(f, "authorization request failed: {e}"),
            Self::Status { status, body } => {
                write!(f, "authorization service returned {status}: {body}")
            }
            Self::Parse { error, .. } => {
                write!(f, "failed to parse authorization response: {error}")
            }
            Self::Other(reason) => write!(f, "authorization failed: {reason}"),
        }
    }
}

impl std::error::Error for AuthorizationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(e) => Some(e),
            Self::Parse { error, .. } => Some(error),
            Self::Status { .. } | Self::Other(_) => None,
        }
    }
}

/// Decides whether `subject` may perform `action` on `resource`.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn check(
        &self,
        subject: &str,
        action: &str,
        resource: &str,
    ) -> Result<bool, AuthorizationError>;
}

#[derive(Debug, Serialize)]
struct CheckUser<'a> {
    key: &'a str,
}

#[derive(Debug, Serialize)]
struct CheckResource<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    tenant: &'a str,
}

#[derive(Debug, Serialize)]
struct CheckRequest<'a> {
    user: CheckUser<'a>,
    action: &'a str,
    resource: CheckResource<'a>,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    allow: bool,
}

/// HTTP client for the Permit.io `/allowed` endpoint.
///
/// No request timeout is configured; a PDP that never answers stalls the
/// calling request.
pub struct PermitClient {
    client: Client,
    pdp_url: String,
    api_key: Option<String>,
}

impl PermitClient {
    /// Create a client for the PDP at `pdp_url` (no trailing slash).
    #[must_use]
    pub fn new(pdp_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            pdp_url: pdp_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl Authorizer for PermitClient {
    async fn check(
        &self,
        subject: &str,
        action: &str,
        resource: &str,
    ) -> Result<bool, AuthorizationError> {
        let request = CheckRequest {
            user: CheckUser { key: subject },
            action,
            resource: CheckResource {
                kind: resource,
                tenant: DEFAULT_TENANT,
            },
        };

        tracing::trace!(action, resource, "sending permission check");

        let mut builder = self
            .client
            .post(format!("{}/allowed", self.pdp_url))
            .json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(AuthorizationError::Request)?;
        let status = response.status();
        let body = response.text().await.map_err(AuthorizationError::Request)?;

        if !status.is_success() {
            return Err(AuthorizationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let decision: CheckResponse =
            serde_json::from_str(&body).map_err(|error| AuthorizationError::Parse {
                body: body.clone(),
                error,
            })?;

        tracing::trace!(action, resource, allow = decision.allow, "permission check answered");
        Ok(decision.allow)
    }
}
