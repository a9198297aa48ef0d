//! Fundamental analysis stage

use analyst_core::{AnalysisState, Result, Stage, StageId, aggregate};
use async_trait::async_trait;
use tracing::info;

use super::analysis_message;
use crate::analysis::fundamental_signals;

/// Scores profitability, valuation and financial health
#[derive(Debug, Default)]
pub struct FundamentalAnalyzerAgent;

impl FundamentalAnalyzerAgent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for FundamentalAnalyzerAgent {
    fn id(&self) -> StageId {
        StageId::Fundamental
    }

    fn name(&self) -> &str {
        "FundamentalAnalyzerAgent"
    }

    async fn run(&self, state: &AnalysisState) -> Result<AnalysisState> {
        let financials = state.data.required_financials(self.id())?;
        let analysis = aggregate(fundamental_signals(financials));

        info!(
            "Fundamental analysis for period {}: {} ({:.2})",
            financials.ratios.period,
            analysis.verdict(),
            analysis.confidence()
        );

        let mut delta = AnalysisState::new().with_message(analysis_message(
            self.id(),
            &analysis,
            state.show_reasoning(),
        ));
        delta.data.fundamental = Some(analysis);
        Ok(delta)
    }
}
