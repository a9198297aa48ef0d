//! Error types for market data and scoring operations

use thiserror::Error;

/// Market data and scoring specific errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// Upstream provider call failed
    #[error("Provider error for {subject}: {reason}")]
    Provider { subject: String, reason: String },

    /// Upstream returned nothing for the request
    #[error("Data not available for {subject}: {reason}")]
    DataUnavailable { subject: String, reason: String },

    /// Ticker is not in the company listing
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    /// Company identifier is unknown to the provider
    #[error("Invalid company identifier: {0}")]
    InvalidCompanyIdentifier(String),

    /// Technical indicator could not be constructed
    #[error("Technical indicator error: {0}")]
    Indicator(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised by the core types (series validation and the like)
    #[error(transparent)]
    Core(#[from] analyst_core::Error),
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;

impl MarketError {
    pub fn provider(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Provider {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Name `subject` as the target of a failed provider call
    ///
    /// Other variants already identify what they refer to and are returned
    /// unchanged.
    pub fn for_subject(self, subject: &str) -> Self {
        match self {
            Self::Provider { reason, .. } => Self::provider(subject, reason),
            other => other,
        }
    }

    pub fn data_unavailable(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            subject: subject.into(),
            reason: reason.into(),
        }
    }
}

/// Convert MarketError to analyst_core::Error
///
/// Provider failures surface as `DataUnavailable` for the same subject, so the
/// pipeline reports them like an empty upstream response.
impl From<MarketError> for analyst_core::Error {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::Provider { subject, reason }
            | MarketError::DataUnavailable { subject, reason } => {
                analyst_core::Error::DataUnavailable { subject, reason }
            }
            MarketError::InvalidTicker(ticker) => analyst_core::Error::InvalidTicker(ticker),
            MarketError::InvalidCompanyIdentifier(id) => {
                analyst_core::Error::InvalidCompanyIdentifier(id)
            }
            MarketError::Core(inner) => inner,
            other @ (MarketError::Indicator(_) | MarketError::Config(_)) => {
                analyst_core::Error::ProcessingFailed(other.to_string())
            }
        }
    }
}

impl From<analyst_utils::ConfigError> for MarketError {
    fn from(err: analyst_utils::ConfigError) -> Self {
        MarketError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::InvalidTicker("INVALID".to_string());
        assert_eq!(err.to_string(), "Invalid ticker: INVALID");

        let err = MarketError::data_unavailable("PETR4", "No quotes found");
        assert_eq!(err.to_string(), "Data not available for PETR4: No quotes found");
    }

    #[test]
    fn test_error_conversion() {
        let core: analyst_core::Error = MarketError::provider("PETR4", "timeout").into();
        assert_eq!(core, analyst_core::Error::data_unavailable("PETR4", "timeout"));

        let core: analyst_core::Error = MarketError::Indicator("period 0".to_string()).into();
        assert!(matches!(core, analyst_core::Error::ProcessingFailed(msg) if msg.contains("period 0")));

        let core: analyst_core::Error = MarketError::InvalidTicker("XXXX3".to_string()).into();
        assert_eq!(core, analyst_core::Error::InvalidTicker("XXXX3".to_string()));
    }

    #[test]
    fn test_for_subject_only_renames_provider_errors() {
        let err = MarketError::provider("", "connection reset").for_subject("9512");
        assert_eq!(err.to_string(), "Provider error for 9512: connection reset");

        let err = MarketError::InvalidTicker("XXXX3".to_string()).for_subject("9512");
        assert!(matches!(err, MarketError::InvalidTicker(t) if t == "XXXX3"));
    }

    #[test]
    fn test_core_errors_pass_through() {
        let original = analyst_core::Error::InvalidSeries("unsorted".to_string());
        let market: MarketError = original.clone().into();
        let back: analyst_core::Error = market.into();
        assert_eq!(back, original);
    }
}
