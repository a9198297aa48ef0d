//! Fundamental scoring from one statement bundle
//!
//! Each category counts how many of its threshold checks are satisfied. A
//! check whose input is not reported is skipped: it counts neither for nor
//! against the score. A zero ROE or market ratio is treated as not reported.
//! A category with no reported input scores zero, which is bearish.

use analyst_core::{FinancialStatementSet, Signal, Verdict};

const MIN_ROE: f64 = 0.15;
const MIN_NET_MARGIN: f64 = 0.20;
const MIN_OPERATING_MARGIN: f64 = 0.15;
const MAX_PRICE_EARNINGS: f64 = 15.0;
const MAX_PRICE_BOOK: f64 = 2.0;
const MIN_DIVIDEND_YIELD: f64 = 0.03;
const MIN_ASSET_COVERAGE: f64 = 1.5;
const MAX_DEBT_EQUITY: f64 = 1.0;

/// Outcome of one category's checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryScore {
    /// Checks whose threshold was met
    pub satisfied: usize,
    /// Checks whose input was available
    pub evaluated: usize,
}

impl CategoryScore {
    fn check(&mut self, outcome: Option<bool>) {
        if let Some(passed) = outcome {
            self.evaluated += 1;
            if passed {
                self.satisfied += 1;
            }
        }
    }

    /// Share of evaluated checks that passed
    pub fn confidence(&self) -> Option<f64> {
        (self.evaluated > 0).then(|| self.satisfied as f64 / self.evaluated as f64)
    }
}

/// Score the profitability checks: ROE, net margin, operating margin
pub fn profitability_score(set: &FinancialStatementSet) -> CategoryScore {
    let mut score = CategoryScore::default();
    score.check(reported(set.ratios.roe).map(|roe| roe > MIN_ROE));
    score.check(set.net_margin().map(|margin| margin > MIN_NET_MARGIN));
    score.check(operating_margin(set).map(|margin| margin > MIN_OPERATING_MARGIN));
    score
}

/// Score the valuation checks: P/E, P/B, dividend yield
pub fn valuation_score(set: &FinancialStatementSet) -> CategoryScore {
    let mut score = CategoryScore::default();
    score.check(reported(set.market.p_e).map(|pe| pe < MAX_PRICE_EARNINGS));
    score.check(reported(set.market.p_b).map(|pb| pb < MAX_PRICE_BOOK));
    score.check(reported(set.market.dividend_yield).map(|dy| dy > MIN_DIVIDEND_YIELD));
    score
}

/// Score the financial health checks: asset coverage, debt to equity
pub fn health_score(set: &FinancialStatementSet) -> CategoryScore {
    let mut score = CategoryScore::default();
    score.check(asset_coverage(set).map(|ratio| ratio > MIN_ASSET_COVERAGE));
    score.check(debt_to_equity(set).map(|ratio| ratio < MAX_DEBT_EQUITY));
    score
}

// Providers report a missing ROE or market ratio as zero.
fn reported(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

// Operating margin from the income statement, or the reported EBIT margin.
fn operating_margin(set: &FinancialStatementSet) -> Option<f64> {
    set.income.operating_margin().or(set.ratios.ebit_margin)
}

/// Assets over liabilities; infinite when there are no liabilities
pub fn asset_coverage(set: &FinancialStatementSet) -> Option<f64> {
    let assets = set.balance.total_assets()?;
    let liabilities = set.balance.total_liabilities()?;
    Some(if liabilities == 0.0 {
        f64::INFINITY
    } else {
        assets / liabilities
    })
}

/// Liabilities over equity
///
/// Undefined for zero equity. Negative equity yields an infinite ratio so the
/// leverage check fails.
pub fn debt_to_equity(set: &FinancialStatementSet) -> Option<f64> {
    let liabilities = set.balance.total_liabilities()?;
    let equity = set.balance.total_equity()?;
    if equity == 0.0 {
        None
    } else if equity < 0.0 {
        Some(f64::INFINITY)
    } else {
        Some(liabilities / equity)
    }
}

// At least `bullish_at` satisfied checks is bullish, none is bearish. A
// category with nothing reported has no satisfied check either.
fn category_signal(
    name: &str,
    score: CategoryScore,
    bullish_at: usize,
    details: String,
) -> Signal {
    if score.evaluated == 0 {
        return Signal::new(
            name,
            Verdict::Bearish,
            format!("{details} (no {} figures reported)", name.to_lowercase()),
        );
    }

    let verdict = if score.satisfied >= bullish_at {
        Verdict::Bullish
    } else if score.satisfied == 0 {
        Verdict::Bearish
    } else {
        Verdict::Neutral
    };

    let mut signal = Signal::new(
        name,
        verdict,
        format!(
            "{details} ({} of {} checks met)",
            score.satisfied, score.evaluated
        ),
    );
    if let Some(confidence) = score.confidence() {
        signal = signal.with_confidence(confidence);
    }
    signal
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn ratio(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_infinite() => "inf".to_string(),
        Some(v) => format!("{v:.2}"),
        None => "n/a".to_string(),
    }
}

pub fn profitability_signal(set: &FinancialStatementSet) -> Signal {
    let details = format!(
        "ROE: {}, Net Margin: {}, Op Margin: {}",
        percent(set.ratios.roe),
        percent(set.net_margin()),
        percent(operating_margin(set)),
    );
    category_signal("Profitability", profitability_score(set), 2, details)
}

pub fn valuation_signal(set: &FinancialStatementSet) -> Signal {
    let details = format!(
        "P/E: {}, P/B: {}, Div Yield: {}",
        ratio(set.market.p_e),
        ratio(set.market.p_b),
        percent(set.market.dividend_yield),
    );
    category_signal("Valuation", valuation_score(set), 2, details)
}

pub fn health_signal(set: &FinancialStatementSet) -> Signal {
    let details = format!(
        "Assets/Liabilities: {}, D/E: {}",
        ratio(asset_coverage(set)),
        ratio(debt_to_equity(set)),
    );
    category_signal("Financial Health", health_score(set), 1, details)
}

/// The three category signals: profitability, valuation, financial health
pub fn fundamental_signals(set: &FinancialStatementSet) -> Vec<Signal> {
    vec![
        profitability_signal(set),
        valuation_signal(set),
        health_signal(set),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong_profitability() -> FinancialStatementSet {
        let mut set = FinancialStatementSet::default();
        set.ratios.roe = Some(0.20);
        set.ratios.net_margin = Some(0.25);
        set.income.revenue = Some(1_000.0);
        set.income.operating_income = Some(180.0);
        set
    }

    #[test]
    fn test_profitability_all_checks_met() {
        let set = strong_profitability();
        let score = profitability_score(&set);
        assert_eq!(score, CategoryScore { satisfied: 3, evaluated: 3 });

        let signal = profitability_signal(&set);
        assert_eq!(signal.verdict(), Verdict::Bullish);
        assert_eq!(signal.confidence(), Some(1.0));
        assert!(signal.rationale().contains("ROE: 20.0%"));
    }

    #[test]
    fn test_net_margin_falls_back_to_income() {
        let mut set = FinancialStatementSet::default();
        set.income.revenue = Some(100.0);
        set.income.net_income = Some(30.0);
        set.income.operating_income = Some(5.0);

        let score = profitability_score(&set);
        assert_eq!(score, CategoryScore { satisfied: 1, evaluated: 2 });
        assert_eq!(profitability_signal(&set).verdict(), Verdict::Neutral);
    }

    #[test]
    fn test_valuation_ignores_absent_ratios() {
        let mut set = FinancialStatementSet::default();
        set.market.p_e = Some(10.0);
        set.market.p_b = Some(1.5);

        let score = valuation_score(&set);
        assert_eq!(score, CategoryScore { satisfied: 2, evaluated: 2 });
        assert_eq!(valuation_signal(&set).verdict(), Verdict::Bullish);

        set.market.p_e = Some(30.0);
        set.market.p_b = Some(4.0);
        set.market.dividend_yield = Some(0.01);
        assert_eq!(valuation_signal(&set).verdict(), Verdict::Bearish);
    }

    #[test]
    fn test_health_without_liabilities_is_satisfied() {
        let mut set = FinancialStatementSet::default();
        set.balance.assets.insert("cash".to_string(), 100.0);
        set.balance.liabilities.insert("loans".to_string(), 0.0);
        set.balance.equity.insert("capital".to_string(), 100.0);

        assert_eq!(asset_coverage(&set), Some(f64::INFINITY));
        let score = health_score(&set);
        assert_eq!(score, CategoryScore { satisfied: 2, evaluated: 2 });
        assert!(health_signal(&set).rationale().contains("inf"));
    }

    #[test]
    fn test_health_one_check_is_enough() {
        let mut set = FinancialStatementSet::default();
        set.balance.assets.insert("total".to_string(), 300.0);
        set.balance.liabilities.insert("total".to_string(), 150.0);
        set.balance.equity.insert("total".to_string(), 100.0);

        // Coverage 2.0 passes, leverage 1.5 fails.
        assert_eq!(health_score(&set), CategoryScore { satisfied: 1, evaluated: 2 });
        assert_eq!(health_signal(&set).verdict(), Verdict::Bullish);

        set.balance.assets.insert("total".to_string(), 160.0);
        assert_eq!(health_signal(&set).verdict(), Verdict::Bearish);
    }

    #[test]
    fn test_negative_equity_fails_leverage() {
        let mut set = FinancialStatementSet::default();
        set.balance.liabilities.insert("total".to_string(), 150.0);
        set.balance.equity.insert("total".to_string(), -10.0);
        assert_eq!(debt_to_equity(&set), Some(f64::INFINITY));
        assert_eq!(health_score(&set), CategoryScore { satisfied: 0, evaluated: 1 });
    }

    #[test]
    fn test_unreported_category_is_bearish() {
        let set = FinancialStatementSet::default();
        let signals = fundamental_signals(&set);
        assert_eq!(signals.len(), 3);
        for signal in &signals {
            assert_eq!(signal.verdict(), Verdict::Bearish);
            assert_eq!(signal.confidence(), None);
            assert!(signal.rationale().contains("figures reported"));
        }

        let valuation = valuation_signal(&set);
        assert!(valuation.rationale().contains("no valuation figures reported"));
    }

    #[test]
    fn test_zero_ratios_count_as_unreported() {
        let mut set = FinancialStatementSet::default();
        set.market.p_e = Some(0.0);
        set.market.p_b = Some(0.0);
        set.market.dividend_yield = Some(0.05);

        assert_eq!(valuation_score(&set), CategoryScore { satisfied: 1, evaluated: 1 });
        assert_eq!(valuation_signal(&set).verdict(), Verdict::Neutral);

        set.ratios.roe = Some(0.0);
        assert_eq!(profitability_score(&set), CategoryScore::default());
    }
}
