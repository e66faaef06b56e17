//! Environment variable access with structured errors.
//!
//! Credentials and deployment overrides (API tokens, base URLs) are read from
//! the process environment at the edges of the application. Unset and blank
//! variables read as absent; set but malformed ones are an error.

use std::str::FromStr;

use thiserror::Error;

/// An environment variable is set but its value could not be parsed.
#[derive(Debug, Error)]
#[error("Invalid value for environment variable {name}: {message}")]
pub struct InvalidEnvVarError {
    pub name: String,
    pub message: String,
}

/// Reads an optional environment variable.
///
/// Unset, empty and whitespace-only values are all reported as `None`, so an
/// exported-but-blank variable behaves like an absent one.
pub fn get_optional_env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads and parses an optional environment variable.
pub fn parse_optional_env_var<T>(name: &str) -> Result<Option<T>, InvalidEnvVarError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env_var(name) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| InvalidEnvVarError {
            name: name.to_string(),
            message: e.to_string(),
        }),
    }
}
