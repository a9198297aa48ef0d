//! Shared utilities for the analyst workspace
//!
//! This crate provides the logging bootstrap and the environment-variable
//! helpers used by the configuration layers of the other crates.

pub mod config;
pub mod logging;

pub use config::{ConfigError, env_var};
pub use logging::{LogFormat, init_tracing, init_tracing_with};
