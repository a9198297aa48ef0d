//! Combining the stage signals into a recommendation

use analyst_core::{
    Action, AggregatedAnalysis, PriceSeries, Recommendation, Signal, Verdict, aggregate,
};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized volatility of daily adjusted-close returns
///
/// Sample standard deviation of the returns scaled by sqrt(252). Needs at
/// least two returns; returns after a non-positive price are skipped.
pub fn annualized_volatility(series: &PriceSeries) -> Option<f64> {
    let closes = series.adj_closes();
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect();
    if returns.len() < 2 {
        return None;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt())
}

/// Action for an aggregated verdict
///
/// Anything below `min_confidence` is a hold.
pub fn action_for(analysis: &AggregatedAnalysis, min_confidence: f64) -> Action {
    if analysis.confidence() < min_confidence {
        return Action::Hold;
    }
    match analysis.verdict() {
        Verdict::Bullish => Action::Buy,
        Verdict::Bearish => Action::Sell,
        Verdict::Neutral => Action::Hold,
    }
}

/// Aggregate every signal and derive an action
pub fn recommend(
    signals: Vec<Signal>,
    quotes: Option<&PriceSeries>,
    min_confidence: f64,
) -> Recommendation {
    let analysis = aggregate(signals);
    let action = action_for(&analysis, min_confidence);
    let annualized_volatility = quotes.and_then(annualized_volatility);

    let mut rationale = format!(
        "{} with confidence {:.2} across {} signal(s)",
        analysis.verdict(),
        analysis.confidence(),
        analysis.signals().len()
    );
    if analysis.verdict() != Verdict::Neutral && action == Action::Hold {
        rationale.push_str(&format!(
            "; confidence below {min_confidence:.2}, holding"
        ));
    }
    if let Some(volatility) = annualized_volatility {
        rationale.push_str(&format!(
            "; annualized volatility {:.1}%",
            volatility * 100.0
        ));
    }

    Recommendation {
        analysis,
        action,
        annualized_volatility,
        rationale,
    }
}
