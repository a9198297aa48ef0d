//! Shared analysis state threaded through the pipeline
//!
//! Each stage returns a partial [`AnalysisState`] holding only what it
//! produced. [`AnalysisState::merge`] folds such a delta into the running
//! state:
//!
//! - `messages` are concatenated in arrival order
//! - every `Option` field in `data` and `metadata` is right-biased: an
//!   incoming `Some` replaces the current value, an incoming `None` leaves it
//!   untouched, so nothing is ever removed mid-run
//!
//! Both rules are associative, which makes the merge associative as well.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::signal::{AggregatedAnalysis, Recommendation, Signal, Verdict, aggregate};
use crate::stage::StageId;
use crate::types::{CompanyInfo, FinancialStatementSet, PriceSeries};

/// Output message appended by one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageMessage {
    pub stage: StageId,
    pub verdict: Option<Verdict>,
    pub confidence: Option<f64>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reasoning: Vec<String>,
}

impl StageMessage {
    pub fn new(stage: StageId, summary: impl Into<String>) -> Self {
        Self {
            stage,
            verdict: None,
            confidence: None,
            summary: summary.into(),
            reasoning: Vec::new(),
        }
    }

    /// Message summarizing an aggregated analysis
    pub fn from_analysis(stage: StageId, analysis: &AggregatedAnalysis) -> Self {
        Self {
            stage,
            verdict: Some(analysis.verdict()),
            confidence: Some(analysis.confidence()),
            summary: format!(
                "{} signal(s): {} bullish, {} bearish, {} neutral",
                analysis.signals().len(),
                analysis.count(Verdict::Bullish),
                analysis.count(Verdict::Bearish),
                analysis.count(Verdict::Neutral),
            ),
            reasoning: Vec::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_reasoning(mut self, reasoning: Vec<String>) -> Self {
        self.reasoning = reasoning;
        self
    }
}

/// Typed data slots written by the stages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisData {
    pub ticker: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub company: Option<CompanyInfo>,
    pub quotes: Option<PriceSeries>,
    pub financials: Option<FinancialStatementSet>,
    pub technical: Option<AggregatedAnalysis>,
    pub fundamental: Option<AggregatedAnalysis>,
    pub sentiment: Option<AggregatedAnalysis>,
    pub recommendation: Option<Recommendation>,
}

impl AnalysisData {
    fn merge_from(&mut self, incoming: AnalysisData) {
        let AnalysisData {
            ticker,
            start_date,
            end_date,
            company,
            quotes,
            financials,
            technical,
            fundamental,
            sentiment,
            recommendation,
        } = incoming;

        overwrite(&mut self.ticker, ticker);
        overwrite(&mut self.start_date, start_date);
        overwrite(&mut self.end_date, end_date);
        overwrite(&mut self.company, company);
        overwrite(&mut self.quotes, quotes);
        overwrite(&mut self.financials, financials);
        overwrite(&mut self.technical, technical);
        overwrite(&mut self.fundamental, fundamental);
        overwrite(&mut self.sentiment, sentiment);
        overwrite(&mut self.recommendation, recommendation);
    }

    /// Ticker or a missing-dependency error naming `stage`
    pub fn required_ticker(&self, stage: StageId) -> Result<&str> {
        self.ticker
            .as_deref()
            .ok_or_else(|| Error::missing_dependency(stage, "ticker"))
    }

    /// Quote history or a missing-dependency error naming `stage`
    pub fn required_quotes(&self, stage: StageId) -> Result<&PriceSeries> {
        self.quotes
            .as_ref()
            .ok_or_else(|| Error::missing_dependency(stage, "quotes"))
    }

    /// Statement bundle or a missing-dependency error naming `stage`
    pub fn required_financials(&self, stage: StageId) -> Result<&FinancialStatementSet> {
        self.financials
            .as_ref()
            .ok_or_else(|| Error::missing_dependency(stage, "financials"))
    }
}

/// Run-level flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub run_id: Option<Uuid>,
    pub show_reasoning: Option<bool>,
}

impl RunMetadata {
    fn merge_from(&mut self, incoming: RunMetadata) {
        let RunMetadata {
            run_id,
            show_reasoning,
        } = incoming;
        overwrite(&mut self.run_id, run_id);
        overwrite(&mut self.show_reasoning, show_reasoning);
    }

    /// Whether stages keep their detailed reasoning (default: yes)
    pub fn show_reasoning(&self) -> bool {
        self.show_reasoning.unwrap_or(true)
    }
}

fn overwrite<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

/// Context threaded through every stage of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisState {
    pub messages: Vec<StageMessage>,
    pub data: AnalysisData,
    pub metadata: RunMetadata,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial state for a run
    pub fn from_params(params: &RunParams, run_id: Uuid) -> Self {
        Self {
            messages: Vec::new(),
            data: AnalysisData {
                ticker: Some(params.ticker.clone()),
                start_date: Some(params.start_date),
                end_date: Some(params.end_date),
                ..AnalysisData::default()
            },
            metadata: RunMetadata {
                run_id: Some(run_id),
                show_reasoning: Some(params.show_reasoning),
            },
        }
    }

    /// Append a message to this (partial) state
    pub fn with_message(mut self, message: StageMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Merge `incoming` on top of `self`
    pub fn merge(mut self, incoming: AnalysisState) -> Self {
        self.merge_from(incoming);
        self
    }

    /// In-place form of [`AnalysisState::merge`]
    pub fn merge_from(&mut self, incoming: AnalysisState) {
        let AnalysisState {
            messages,
            data,
            metadata,
        } = incoming;
        self.messages.extend(messages);
        self.data.merge_from(data);
        self.metadata.merge_from(metadata);
    }

    pub fn show_reasoning(&self) -> bool {
        self.metadata.show_reasoning()
    }

    /// Signals of the analysis stages, in technical, fundamental, sentiment order
    pub fn collected_signals(&self) -> Vec<Signal> {
        [
            &self.data.technical,
            &self.data.fundamental,
            &self.data.sentiment,
        ]
        .into_iter()
        .flatten()
        .flat_map(|analysis| analysis.signals().iter().cloned())
        .collect()
    }

    /// Best-effort overall analysis
    ///
    /// The recommendation's analysis when the combining stage ran, otherwise
    /// an aggregation of whatever signals are present.
    pub fn final_analysis(&self) -> AggregatedAnalysis {
        match &self.data.recommendation {
            Some(recommendation) => recommendation.analysis.clone(),
            None => aggregate(self.collected_signals()),
        }
    }
}

/// Parameters of one analysis request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParams {
    pub ticker: String,
    /// First day of the quote window, inclusive
    pub start_date: NaiveDate,
    /// Last day of the quote window, inclusive
    pub end_date: NaiveDate,
    pub show_reasoning: bool,
}

impl RunParams {
    /// Validate and normalize run parameters
    ///
    /// The ticker is trimmed and upper-cased. Reasoning is retained by default.
    pub fn new(ticker: &str, start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        let ticker = ticker.trim().to_ascii_uppercase();
        if ticker.is_empty() {
            return Err(Error::InvalidTicker("ticker must not be empty".to_string()));
        }
        if start_date > end_date {
            return Err(Error::InvalidParameters(format!(
                "start date {start_date} is after end date {end_date}"
            )));
        }
        Ok(Self {
            ticker,
            start_date,
            end_date,
            show_reasoning: true,
        })
    }

    /// Build from ISO `YYYY-MM-DD` date strings
    pub fn parse(ticker: &str, start_date: &str, end_date: &str) -> Result<Self> {
        Self::new(ticker, parse_date(start_date)?, parse_date(end_date)?)
    }

    pub fn with_show_reasoning(mut self, show_reasoning: bool) -> Self {
        self.show_reasoning = show_reasoning;
        self
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidParameters(format!("invalid date `{value}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn message(stage: StageId, summary: &str) -> StageMessage {
        StageMessage::new(stage, summary)
    }

    fn sample_states() -> (AnalysisState, AnalysisState, AnalysisState) {
        let mut a = AnalysisState::new().with_message(message(StageId::MarketData, "a"));
        a.data.ticker = Some("PETR4".to_string());
        a.data.start_date = Some(date(1));
        a.metadata.show_reasoning = Some(true);

        let mut b = AnalysisState::new().with_message(message(StageId::Technical, "b"));
        b.data.ticker = Some("VALE3".to_string());
        b.data.end_date = Some(date(20));

        let mut c = AnalysisState::new().with_message(message(StageId::Risk, "c"));
        c.data.start_date = Some(date(5));
        c.metadata.show_reasoning = Some(false);

        (a, b, c)
    }

    #[test]
    fn test_merge_is_right_biased() {
        let (a, b, _) = sample_states();
        let merged = a.merge(b);
        assert_eq!(merged.data.ticker.as_deref(), Some("VALE3"));
        assert_eq!(merged.data.start_date, Some(date(1)));
        assert_eq!(merged.data.end_date, Some(date(20)));
    }

    #[test]
    fn test_merge_never_removes_values() {
        let (a, _, _) = sample_states();
        let merged = a.clone().merge(AnalysisState::new());
        assert_eq!(merged, a);
    }

    #[test]
    fn test_merge_concatenates_messages_in_order() {
        let (a, b, c) = sample_states();
        let merged = a.merge(b).merge(c);
        let summaries: Vec<&str> = merged.messages.iter().map(|m| m.summary.as_str()).collect();
        assert_eq!(summaries, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_is_associative() {
        let (a, b, c) = sample_states();
        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = a.merge(b.merge(c));
        assert_eq!(left, right);
        assert!(!left.show_reasoning());
    }

    #[test]
    fn test_show_reasoning_defaults_to_true() {
        assert!(AnalysisState::new().show_reasoning());
    }

    #[test]
    fn test_required_inputs_report_missing_dependency() {
        let state = AnalysisState::new();
        let err = state.data.required_quotes(StageId::Technical).unwrap_err();
        assert_eq!(err, Error::missing_dependency(StageId::Technical, "quotes"));
        assert!(state.data.required_financials(StageId::Fundamental).is_err());
        assert!(state.data.required_ticker(StageId::MarketData).is_err());
    }

    #[test]
    fn test_collected_signals_follow_stage_order() {
        let mut state = AnalysisState::new();
        state.data.sentiment = Some(aggregate(vec![Signal::new(
            "Momentum",
            Verdict::Bearish,
            "down",
        )]));
        state.data.technical = Some(aggregate(vec![Signal::new("MACD", Verdict::Bullish, "up")]));

        let names: Vec<String> = state
            .collected_signals()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["MACD", "Momentum"]);

        let analysis = state.final_analysis();
        assert_eq!(analysis.verdict(), Verdict::Neutral);
        assert_eq!(analysis.signals().len(), 2);
    }

    #[test]
    fn test_run_params_normalize_ticker() {
        let params = RunParams::parse(" petr4 ", "2024-01-01", "2024-03-01").unwrap();
        assert_eq!(params.ticker, "PETR4");
        assert!(params.show_reasoning);

        let state = AnalysisState::from_params(&params, Uuid::new_v4());
        assert_eq!(state.data.ticker.as_deref(), Some("PETR4"));
        assert!(state.metadata.run_id.is_some());
    }

    #[test]
    fn test_run_params_reject_bad_input() {
        assert!(matches!(
            RunParams::new("  ", date(1), date(2)),
            Err(Error::InvalidTicker(_))
        ));
        assert!(matches!(
            RunParams::new("PETR4", date(3), date(2)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(RunParams::parse("PETR4", "2024-13-01", "2024-12-01").is_err());
    }
}
