//! Typed environment variable access

use std::str::FromStr;
use thiserror::Error;

/// Error reading a typed environment variable
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid value '{value}' for {name}: {reason}")]
pub struct EnvError {
    /// Variable name
    pub name: String,
    /// Raw value found in the environment
    pub value: String,
    /// Parser message
    pub reason: String,
}

/// Read a variable, treating unset and blank values the same
pub fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read and parse a variable; `Ok(None)` when it is unset or blank
pub fn env_parse<T>(name: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(name)
        .map(|value| {
            value.parse::<T>().map_err(|e| EnvError {
                name: name.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
