//! Concrete pipeline stages

pub mod data_fetcher;
pub mod fundamental_analyzer;
pub mod risk_manager;
pub mod sentiment_analyzer;
pub mod technical_analyzer;

pub use data_fetcher::MarketDataAgent;
pub use fundamental_analyzer::FundamentalAnalyzerAgent;
pub use risk_manager::RiskManagerAgent;
pub use sentiment_analyzer::SentimentAnalyzerAgent;
pub use technical_analyzer::TechnicalAnalyzerAgent;

use analyst_core::{AggregatedAnalysis, Signal, StageId, StageMessage};

/// Message summarizing an analysis, with one reasoning line per signal
/// when reasoning is retained
pub(crate) fn analysis_message(
    stage: StageId,
    analysis: &AggregatedAnalysis,
    show_reasoning: bool,
) -> StageMessage {
    let message = StageMessage::from_analysis(stage, analysis);
    if show_reasoning {
        message.with_reasoning(analysis.signals().iter().map(reasoning_line).collect())
    } else {
        message
    }
}

fn reasoning_line(signal: &Signal) -> String {
    match signal.confidence() {
        Some(confidence) => format!(
            "{}: {} ({:.2}) - {}",
            signal.name(),
            signal.verdict(),
            confidence,
            signal.rationale()
        ),
        None => format!(
            "{}: {} - {}",
            signal.name(),
            signal.verdict(),
            signal.rationale()
        ),
    }
}
