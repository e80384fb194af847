//! Bearer token lookup
//!
//! Tokens come from `--token` or the INSIGHTS_TOKEN environment variable.
//! Nothing is written to disk.

use std::env;

pub const TOKEN_ENV: &str = "INSIGHTS_TOKEN";

/// Get the access token from the environment, ignoring empty values
pub fn get_token() -> Option<String> {
    env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty())
}

/// Explicit token first, then the environment
pub fn resolve_token(explicit: Option<&str>) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(get_token)
}
