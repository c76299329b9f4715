// System components:
//  - Static table of variables per environment level
//  - API key token codec (HS256 JWT)
//  - Authorizer: Permit.io policy decision point behind a trait
//  - HTTP router tying them together

pub mod auth;
pub mod config;
mod e2e_tests;
pub mod environment;
pub mod router;

pub use router::{AppState, build_router};
