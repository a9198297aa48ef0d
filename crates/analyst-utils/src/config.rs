//! Configuration management utilities

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

/// Error raised while reading configuration from the environment
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The variable is set but does not parse
    #[error("Invalid value for {name}: `{value}` ({reason})")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    /// The variable is set but is not valid unicode
    #[error("Environment variable {0} is not valid unicode")]
    NotUnicode(String),
}

/// Read and parse an environment variable
///
/// Returns `Ok(None)` when the variable is unset or empty. A value that is
/// present but malformed is an error rather than silently ignored.
pub fn env_var<T>(name: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => parse_value(name, &raw).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(name.to_string())),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
