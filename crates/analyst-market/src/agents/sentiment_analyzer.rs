//! Price-action sentiment stage

use analyst_core::{AnalysisState, Result, Stage, StageId, aggregate};
use async_trait::async_trait;
use tracing::info;

use super::analysis_message;
use crate::analysis::sentiment_signals;
use crate::config::SentimentSettings;

/// Reads momentum and volume pressure from the quote history
pub struct SentimentAnalyzerAgent {
    settings: SentimentSettings,
}

impl SentimentAnalyzerAgent {
    pub fn new(settings: SentimentSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Stage for SentimentAnalyzerAgent {
    fn id(&self) -> StageId {
        StageId::Sentiment
    }

    fn name(&self) -> &str {
        "SentimentAnalyzerAgent"
    }

    async fn run(&self, state: &AnalysisState) -> Result<AnalysisState> {
        let quotes = state.data.required_quotes(self.id())?;
        let analysis = aggregate(sentiment_signals(quotes, &self.settings));

        info!(
            "Sentiment analysis: {} ({:.2})",
            analysis.verdict(),
            analysis.confidence()
        );

        let mut delta = AnalysisState::new().with_message(analysis_message(
            self.id(),
            &analysis,
            state.show_reasoning(),
        ));
        delta.data.sentiment = Some(analysis);
        Ok(delta)
    }
}
