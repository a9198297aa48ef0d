//! Ternary signals and the majority-rule aggregator

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of an opinion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Bullish,
    Bearish,
    Neutral,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opinion produced by one indicator or sub-analysis
///
/// Fields are private: a signal does not change after it is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    name: String,
    verdict: Verdict,
    confidence: Option<f64>,
    rationale: String,
}

impl Signal {
    pub fn new(name: impl Into<String>, verdict: Verdict, rationale: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verdict,
            confidence: None,
            rationale: rationale.into(),
        }
    }

    /// Neutral signal for an indicator that lacks enough observations
    pub fn insufficient_data(name: impl Into<String>, needed: usize, available: usize) -> Self {
        Self::new(
            name,
            Verdict::Neutral,
            format!("insufficient data: need {needed} observations, have {available}"),
        )
        .with_confidence(0.0)
    }

    /// Attach a confidence, clamped to [0, 1]
    ///
    /// A non-finite value leaves the signal without confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.is_finite().then(|| confidence.clamp(0.0, 1.0));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn rationale(&self) -> &str {
        &self.rationale
    }
}

/// Overall opinion derived from a list of signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedAnalysis {
    verdict: Verdict,
    confidence: f64,
    signals: Vec<Signal>,
}

impl AggregatedAnalysis {
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Share of signals backing the winning side, in [0, 1]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn into_signals(self) -> Vec<Signal> {
        self.signals
    }

    /// Number of signals with the given verdict
    pub fn count(&self, verdict: Verdict) -> usize {
        self.signals.iter().filter(|s| s.verdict == verdict).count()
    }
}

impl Default for AggregatedAnalysis {
    fn default() -> Self {
        aggregate(Vec::new())
    }
}

/// Combine signals by majority rule
///
/// The verdict is whichever of bullish/bearish has more votes (neutral on a
/// tie). Confidence is `max(bullish, bearish) / total`; an empty list is
/// neutral with confidence 0. Per-signal confidence does not weigh in.
pub fn aggregate(signals: Vec<Signal>) -> AggregatedAnalysis {
    let bullish = signals.iter().filter(|s| s.verdict == Verdict::Bullish).count();
    let bearish = signals.iter().filter(|s| s.verdict == Verdict::Bearish).count();

    let verdict = match bullish.cmp(&bearish) {
        std::cmp::Ordering::Greater => Verdict::Bullish,
        std::cmp::Ordering::Less => Verdict::Bearish,
        std::cmp::Ordering::Equal => Verdict::Neutral,
    };

    let confidence = if signals.is_empty() {
        0.0
    } else {
        bullish.max(bearish) as f64 / signals.len() as f64
    };

    AggregatedAnalysis {
        verdict,
        confidence,
        signals,
    }
}

/// Suggested position change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Hold => "hold",
        })
    }
}

/// Output of the combining stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub analysis: AggregatedAnalysis,
    pub action: Action,
    /// Annualized volatility of daily adjusted-close returns
    pub annualized_volatility: Option<f64>,
    pub rationale: String,
}
