// Life of a `GET /getEnv/{environment_level}` request:
// 1. Parse the level from the path (400 if unknown)
// 2. Resolve X-API-Key: decoded token, else raw value (401 if absent)
// 3. Ask the authorizer for (credential, "read", "env<level>")
//     - fault: 500, detail logged only
//     - deny:  403
// 4. Look up the level's variables (500 if missing) and return them

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;

use crate::auth::{Authorizer, TokenCodec, resolve_credential};
use crate::environment::{EnvironmentLevel, EnvironmentTable, EnvironmentVariableSet};

/// Header carrying the raw API key or a signed token.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Action checked for every variable read.
pub const READ_ACTION: &str = "read";

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
#[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected for shared state
pub struct AppState {
    /// Variables served per level.
    pub environments: Arc<EnvironmentTable>,
    /// Codec for API key tokens.
    pub tokens: Arc<TokenCodec>,
    /// Policy decision point.
    pub authorizer: Arc<dyn Authorizer>,
}

impl AppState {
    #[must_use]
    pub fn new(
        environments: EnvironmentTable,
        tokens: TokenCodec,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        Self {
            environments: Arc::new(environments),
            tokens: Arc::new(tokens),
            authorizer,
        }
    }
}

/// Error returned to HTTP callers as `{"error": "..."}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiError {
    /// The path named an unknown environment level.
    InvalidLevel,
    /// `POST /encodeApiKey` without a string `apiKey`.
    InvalidRequestBody,
    /// No usable `X-API-Key` header.
    MissingApiKey,
    /// The authorizer denied the request.
    AccessDenied,
    /// An upstream or internal fault. Details are only logged.
    Internal,
    /// A valid level has no configured variables.
    ServerConfiguration,
}

impl ApiError {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::InvalidLevel | Self::InvalidRequestBody => StatusCode::BAD_REQUEST,
            Self::MissingApiKey => StatusCode::UNAUTHORIZED,
            Self::AccessDenied => StatusCode::FORBIDDEN,
            Self::Internal | Self::ServerConfiguration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidLevel => {
                "Invalid environment level specified. Use 'dev', 'staging', or 'prod'."
            }
            Self::InvalidRequestBody => "apiKey (string) is required in request body.",
            Self::MissingApiKey => "API Key required.",
            Self::AccessDenied => "Access Denied.",
            Self::Internal => "Internal server error.",
            Self::ServerConfiguration => "Server configuration error.",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorBody {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct TokenBody {
    token: String,
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/getEnv/{environment_level}", get(get_env))
        .route("/encodeApiKey", post(encode_api_key))
        .with_state(state)
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        message: "Env Var Hosting Service Demo running.",
    })
}

async fn get_env(
    State(state): State<AppState>,
    Path(environment_level): Path<String>,
    headers: HeaderMap,
) -> Result<Json<EnvironmentVariableSet>, ApiError> {
    let level: EnvironmentLevel = environment_level.parse().map_err(|e| {
        tracing::debug!("rejecting request: {e}");
        ApiError::InvalidLevel
    })?;

    let header = headers.get(API_KEY_HEADER).map(header_text);
    let credential = resolve_credential(header.as_deref(), &state.tokens).ok_or_else(|| {
        tracing::debug!(%level, "rejecting request without API key");
        ApiError::MissingApiKey
    })?;
    tracing::debug!(%level, decoded = credential.is_decoded(), "resolved credential");

    let subject = credential.into_inner();
    let resource = level.resource();
    let allowed = state
        .authorizer
        .check(&subject, READ_ACTION, &resource)
        .await
        .map_err(|e| {
            tracing::error!(%level, "authorization check failed: {e}");
            ApiError::Internal
        })?;

    if !allowed {
        tracing::info!(%level, "access denied");
        return Err(ApiError::AccessDenied);
    }

    let variables = state.environments.get(level).ok_or_else(|| {
        tracing::error!(%level, "no variables configured for level");
        ApiError::ServerConfiguration
    })?;

    Ok(Json(variables.clone()))
}

/// Header bytes as text: UTF-8 when valid, otherwise latin-1.
fn header_text(value: &HeaderValue) -> Cow<'_, str> {
    let bytes = value.as_bytes();
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().copied().map(char::from).collect()),
    }
}

/// True for `application/json`, with or without parameters.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

async fn encode_api_key(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TokenBody>, ApiError> {
    // Bodies of any other type are left unparsed.
    if !is_json_content_type(&headers) {
        tracing::debug!("rejecting token request without a JSON content type");
        return Err(ApiError::InvalidRequestBody);
    }

    let api_key = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|value| value.get("apiKey")?.as_str().map(str::to_string))
        .filter(|api_key| !api_key.is_empty())
        .ok_or(ApiError::InvalidRequestBody)?;

    let token = state.tokens.encode(&api_key).map_err(|e| {
        tracing::error!("failed to encode API key: {e}");
        ApiError::Internal
    })?;

    Ok(Json(TokenBody { token }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(ApiError::InvalidLevel.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidRequestBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingApiKey.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::AccessDenied.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ApiError::ServerConfiguration.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_header_text_decoding() {
        let ascii = HeaderValue::from_static("dev123");
        assert_eq!(header_text(&ascii), "dev123");

        let utf8 = HeaderValue::from_bytes("ключ".as_bytes()).expect("obs-text header");
        assert_eq!(header_text(&utf8), "ключ");

        let latin1 = HeaderValue::from_bytes(b"caf\xe9").expect("obs-text header");
        assert_eq!(header_text(&latin1), "café");
    }

    #[test]
    fn test_json_content_type() {
        let with = |value: &'static str| {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
            headers
        };
        assert!(is_json_content_type(&with("application/json")));
        assert!(is_json_content_type(&with("application/json; charset=utf-8")));
        assert!(is_json_content_type(&with("Application/JSON")));
        assert!(!is_json_content_type(&with("text/plain")));
        assert!(!is_json_content_type(&with("application/jsonp")));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(ApiError::MissingApiKey.to_string(), "API Key required.");
        assert_eq!(ApiError::AccessDenied.to_string(), "Access Denied.");
        assert_eq!(ApiError::Internal.to_string(), "Internal server error.");
    }
}
