//! Technical analysis stage

use analyst_core::{AnalysisState, Result, Stage, StageId, aggregate};
use async_trait::async_trait;
use tracing::info;

use super::analysis_message;
use crate::analysis::technical_signals;
use crate::config::IndicatorSettings;

/// Computes MACD, RSI, Bollinger and OBV signals from the quote history
pub struct TechnicalAnalyzerAgent {
    settings: IndicatorSettings,
}

impl TechnicalAnalyzerAgent {
    pub fn new(settings: IndicatorSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Stage for TechnicalAnalyzerAgent {
    fn id(&self) -> StageId {
        StageId::Technical
    }

    fn name(&self) -> &str {
        "TechnicalAnalyzerAgent"
    }

    async fn run(&self, state: &AnalysisState) -> Result<AnalysisState> {
        let quotes = state.data.required_quotes(self.id())?;
        let analysis = aggregate(technical_signals(quotes, &self.settings)?);

        info!(
            "Technical analysis over {} quotes: {} ({:.2})",
            quotes.len(),
            analysis.verdict(),
            analysis.confidence()
        );

        let mut delta = AnalysisState::new().with_message(analysis_message(
            self.id(),
            &analysis,
            state.show_reasoning(),
        ));
        delta.data.technical = Some(analysis);
        Ok(delta)
    }
}
