//! Server configuration module.
//!
//! This module provides configuration loading for the envhost server from
//! environment variables. A `.env` file in the working directory is applied
//! before the variables are read (see [`load_dotenv`]).
//!
//! # Environment Variables
//!
//! - `PORT`: Port to listen on (default: `3000`)
//! - `PERMIT_API_KEY`: Bearer token for the Permit.io policy decision point (optional)
//! - `PERMIT_PDP_URL`: Base URL of the policy decision point (default: `https://cloudpdp.api.permit.io`)
//! - `JWT_SECRET`: Secret used to sign API key tokens (default: an insecure demo secret)
//!
//! # Invariants
//!
//! - `listen_port` is always a valid port number
//! - `jwt_secret` is never empty

use std::path::PathBuf;

/// Server configuration.
///
/// Contains all configuration parameters needed to run the envhost server.
#[derive(Clone)]
pub struct ServerConfig {
    /// Port to listen on for HTTP connections.
    pub listen_port: u16,
    /// Bearer token sent to the policy decision point.
    /// `None` means checks are sent unauthenticated and will be rejected upstream.
    pub permit_api_key: Option<String>,
    /// Base URL of the policy decision point.
    pub permit_pdp_url: String,
    /// HS256 secret for signing and verifying API key tokens.
    pub jwt_secret: String,
    /// True when `jwt_secret` came from [`ServerConfig::INSECURE_JWT_SECRET`].
    pub jwt_secret_is_fallback: bool,
}

// Secrets stay out of debug output so the config can be logged.
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("listen_port", &self.listen_port)
            .field("permit_api_key", &self.permit_api_key.as_ref().map(|_| "<redacted>"))
            .field("permit_pdp_url", &self.permit_pdp_url)
            .field("jwt_secret", &"<redacted>")
            .field("jwt_secret_is_fallback", &self.jwt_secret_is_fallback)
            .finish()
    }
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 3000;
    /// Default Permit.io cloud PDP.
    pub const DEFAULT_PDP_URL: &'static str = "https://cloudpdp.api.permit.io";
    /// Signing secret used when `JWT_SECRET` is unset. Not safe outside of demos.
    pub const INSECURE_JWT_SECRET: &'static str = "your_jwt_secret";

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but not a valid port number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let listen_port = Self::parse_listen_port(lookup("PORT"))?;
        let permit_api_key = lookup("PERMIT_API_KEY");
        let permit_pdp_url = lookup("PERMIT_PDP_URL")
            .map_or_else(|| Self::DEFAULT_PDP_URL.to_string(), |url| url.trim_end_matches('/').to_string());
        let (jwt_secret, jwt_secret_is_fallback) = lookup("JWT_SECRET")
            .map_or_else(|| (Self::INSECURE_JWT_SECRET.to_string(), true), |secret| (secret, false));

        Ok(Self {
            listen_port,
            permit_api_key,
            permit_pdp_url,
            jwt_secret,
            jwt_secret_is_fallback,
        })
    }

    /// Parse the listen port, returning the default if not set.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is set but not a valid port number.
    fn parse_listen_port(value: Option<String>) -> Result<u16, ConfigError> {
        match value {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT".to_string(),
                message: format!("'{value}' is not a valid port number (must be 0-65535)"),
            }),
            None => Ok(Self::DEFAULT_PORT),
        }
    }
}

/// Apply a `.env` file from the working directory, if there is one.
///
/// Variables already present in the process environment win. Returns the
/// path that was loaded, or `None` when there is no `.env` file.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenv::Error> {
    match dotenv::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
