//! End-to-end tests at the HTTP request/response level.
//!
//! Each test file covers a specific scenario, driving the full router with a
//! stub authorizer in place of the policy decision point.

#![cfg(test)]

mod helpers;

mod test_authorization_denied;
mod test_authorization_fault;
mod test_encode_api_key;
mod test_get_env_success;
mod test_health;
mod test_invalid_level;
mod test_missing_api_key;
mod test_missing_configuration;
mod test_token_credentials;
