//! Logging and tracing utilities

use std::str::FromStr;

use tracing::{Subscriber, debug};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ConfigError, env_var};

/// Environment variable selecting the log output format
pub const LOG_FORMAT_VAR: &str = "ANALYST_LOG_FORMAT";

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}`")),
        }
    }
}

/// Initialize tracing subscriber with default configuration
///
/// The filter comes from `RUST_LOG` (default `info`), the format from
/// `ANALYST_LOG_FORMAT`.
pub fn init_tracing() -> Result<(), ConfigError> {
    let format = env_var::<LogFormat>(LOG_FORMAT_VAR)?.unwrap_or_default();
    init_tracing_with(format);
    Ok(())
}

/// Initialize tracing subscriber with an explicit format
pub fn init_tracing_with(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    build_subscriber(format, filter).init();
    debug!(?format, "Tracing initialized");
}

fn build_subscriber(format: LogFormat, filter: EnvFilter) -> Box<dyn Subscriber + Send + Sync> {
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => Box::new(registry.with(tracing_subscriber::fmt::layer())),
        LogFormat::Json => Box::new(registry.with(tracing_subscriber::fmt::layer().json())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!(" Pretty ".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_subscriber_applies_filter() {
        for format in [LogFormat::Pretty, LogFormat::Json] {
            let subscriber = build_subscriber(format, EnvFilter::new("info"));
            tracing::subscriber::with_default(subscriber, || {
                assert!(tracing::enabled!(tracing::Level::INFO));
                assert!(!tracing::enabled!(tracing::Level::DEBUG));
            });
        }
    }

    #[test]
    fn test_default_format() {
        assert_eq!(LogFormat::default(), LogFormat::Pretty);
    }
}
