//! Combining stage: one recommendation from every analysis

use analyst_core::{AnalysisState, Result, Stage, StageId};
use async_trait::async_trait;
use tracing::info;

use super::analysis_message;
use crate::analysis::recommend;

/// Aggregates the technical, fundamental and sentiment signals and derives
/// an action
///
/// Runs on whatever analyses completed; a failed sibling simply contributes
/// no signals.
pub struct RiskManagerAgent {
    min_action_confidence: f64,
}

impl RiskManagerAgent {
    pub fn new(min_action_confidence: f64) -> Self {
        Self {
            min_action_confidence,
        }
    }
}

#[async_trait]
impl Stage for RiskManagerAgent {
    fn id(&self) -> StageId {
        StageId::Risk
    }

    fn name(&self) -> &str {
        "RiskManagerAgent"
    }

    async fn run(&self, state: &AnalysisState) -> Result<AnalysisState> {
        let recommendation = recommend(
            state.collected_signals(),
            state.data.quotes.as_ref(),
            self.min_action_confidence,
        );

        info!(
            "Recommendation: {} ({})",
            recommendation.action, recommendation.rationale
        );

        let mut message = analysis_message(
            self.id(),
            &recommendation.analysis,
            state.show_reasoning(),
        )
        .with_summary(format!(
            "{}: {}",
            recommendation.action, recommendation.rationale
        ));
        if state.show_reasoning() {
            let contributions = [
                ("technical", &state.data.technical),
                ("fundamental", &state.data.fundamental),
                ("sentiment", &state.data.sentiment),
            ]
            .into_iter()
            .map(|(stage, analysis)| match analysis {
                Some(a) => format!("{stage}: {} ({:.2})", a.verdict(), a.confidence()),
                None => format!("{stage}: not available"),
            });
            message.reasoning.splice(0..0, contributions);
        }

        let mut delta = AnalysisState::new().with_message(message);
        delta.data.recommendation = Some(recommendation);
        Ok(delta)
    }
}
