//! Error types for analyst-core

use thiserror::Error;

use crate::stage::StageId;

/// Result type alias for analyst-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for pipeline operations
///
/// Stage failures are stored in run reports, so the type is `Clone` and
/// compares by value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Upstream fetch failed or returned no rows
    #[error("Data not available for {subject}: {reason}")]
    DataUnavailable { subject: String, reason: String },

    /// A stage's required upstream input is absent from the state
    #[error("Stage {stage} is missing required input `{input}`")]
    MissingDependency { stage: StageId, input: String },

    /// Ticker could not be resolved
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),

    /// Company identifier could not be resolved
    #[error("Invalid company identifier: {0}")]
    InvalidCompanyIdentifier(String),

    /// Price bars violate the ordering invariant
    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    /// Run parameters are malformed
    #[error("Invalid run parameters: {0}")]
    InvalidParameters(String),

    /// A stage was requested or depended upon but never registered
    #[error("Stage {0} is not registered with the pipeline")]
    UnregisteredStage(StageId),

    /// Two stages were registered under the same identifier
    #[error("Stage {0} is registered more than once")]
    DuplicateStage(StageId),

    /// Stage processing failed
    #[error("Stage processing failed: {0}")]
    ProcessingFailed(String),
}

impl Error {
    /// Build a [`Error::DataUnavailable`]
    pub fn data_unavailable(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`Error::MissingDependency`]
    pub fn missing_dependency(stage: StageId, input: impl Into<String>) -> Self {
        Self::MissingDependency {
            stage,
            input: input.into(),
        }
    }
}
