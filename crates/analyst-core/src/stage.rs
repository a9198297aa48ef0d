//! Pipeline stage identifiers and the `Stage` trait

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{AnalysisState, Result};

/// Identifier of a pipeline stage
///
/// Variants are declared in canonical execution order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    MarketData,
    Technical,
    Fundamental,
    Sentiment,
    Risk,
}

impl StageId {
    /// All stages in canonical order
    pub const ALL: [StageId; 5] = [
        Self::MarketData,
        Self::Technical,
        Self::Fundamental,
        Self::Sentiment,
        Self::Risk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MarketData => "market_data",
            Self::Technical => "technical",
            Self::Fundamental => "fundamental",
            Self::Sentiment => "sentiment",
            Self::Risk => "risk",
        }
    }

    /// Stages whose output this stage cannot run without
    ///
    /// When one of these fails, this stage is not run.
    pub fn requires(self) -> &'static [StageId] {
        match self {
            Self::MarketData => &[],
            Self::Technical | Self::Fundamental | Self::Sentiment | Self::Risk => {
                &[Self::MarketData]
            }
        }
    }

    /// Stages that must run first when they are part of the same plan
    ///
    /// Unlike [`StageId::requires`], these are ordering edges only: a
    /// failure upstream leaves this stage free to run on what is there.
    pub fn runs_after(self) -> &'static [StageId] {
        match self {
            Self::Risk => &[Self::Technical, Self::Fundamental, Self::Sentiment],
            _ => &[],
        }
    }

    /// Whether every other stage depends on this one
    pub fn is_root(self) -> bool {
        self.requires().is_empty()
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StageId {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::InvalidParameters(format!("unknown stage `{s}`")))
    }
}

/// One step of the analysis pipeline
///
/// A stage reads the shared state and returns a partial state holding only
/// what it produced. The pipeline merges that delta into the running state,
/// so a stage never mutates state it was handed.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Identifier used for planning and dependency checks
    fn id(&self) -> StageId;

    /// Human-readable name used in logs and messages
    fn name(&self) -> &str;

    /// Run the stage against the current state
    async fn run(&self, state: &AnalysisState) -> Result<AnalysisState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_market_data_is_root() {
        let roots: Vec<StageId> = StageId::ALL.into_iter().filter(|s| s.is_root()).collect();
        assert_eq!(roots, vec![StageId::MarketData]);
    }

    #[test]
    fn test_risk_orders_after_analysis_stages() {
        let after = StageId::Risk.runs_after();
        assert!(after.contains(&StageId::Technical));
        assert!(after.contains(&StageId::Fundamental));
        assert!(after.contains(&StageId::Sentiment));
        assert!(StageId::Technical.runs_after().is_empty());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Market_Data".parse::<StageId>().unwrap(), StageId::MarketData);
        assert_eq!(" risk ".parse::<StageId>().unwrap(), StageId::Risk);
        assert!("valuation".parse::<StageId>().is_err());
        assert_eq!(StageId::Fundamental.to_string(), "fundamental");
    }

    struct Echo;

    #[async_trait]
    impl Stage for Echo {
        fn id(&self) -> StageId {
            StageId::Sentiment
        }

        fn name(&self) -> &str {
            "echo"
        }

        async fn run(&self, state: &AnalysisState) -> Result<AnalysisState> {
            let ticker = state.data.required_ticker(self.id())?;
            Ok(AnalysisState::new()
                .with_message(crate::StageMessage::new(self.id(), ticker.to_string())))
        }
    }

    #[tokio::test]
    async fn test_stage_returns_delta() {
        let mut state = AnalysisState::new();
        assert!(Echo.run(&state).await.is_err());

        state.data.ticker = Some("ITUB4".to_string());
        let delta = Echo.run(&state).await.unwrap();
        assert_eq!(delta.messages.len(), 1);
        assert!(delta.data.ticker.is_none());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_value(StageId::MarketData).unwrap();
        assert_eq!(json, serde_json::json!("market_data"));
    }
}
