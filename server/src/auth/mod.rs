//! Authentication and authorization module.
//!
//! # Pre-conditions
//! - The token secret is non-empty.
//!
//! # Post-conditions
//! - The token codec and authorizer are immutable once built and shared
//!   across requests.
//!
//! # Invariants
//! - A credential that fails to decode as a token is used as a raw API key.

pub mod credential;
pub mod permit;
pub mod token;

pub use credential::{ResolvedCredential, resolve_credential};
pub use permit::{AuthorizationError, Authorizer, PermitClient};
pub use token::{TokenCodec, TokenError};
