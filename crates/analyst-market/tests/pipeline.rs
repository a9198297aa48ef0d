//! End-to-end runs of the analysis engine against in-memory providers

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use analyst_core::{
    BalanceSheet, CompanyInfo, Error, FinancialRatios, FinancialStatementSet, IncomeStatement,
    MarketRatios, PriceBar, RunParams, StageId, Verdict,
};
use analyst_market::{
    AnalysisEngine, MarketConfig, MarketDataProvider, MarketError, StaticProvider,
};
use analyst_workflow::StageOutcome;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta};
use tokio_test::assert_ok;

const TICKER: &str = "TEST3";

fn company() -> CompanyInfo {
    CompanyInfo {
        name: "Test Industrias SA".to_string(),
        trade_name: "TEST IND".to_string(),
        company_id: "1023".to_string(),
        ticker: TICKER.to_string(),
        sector: None,
        subsector: None,
        segment: None,
        listed: true,
    }
}

fn bars(closes: &[f64]) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .zip(0_i64..)
        .map(|(&close, day)| PriceBar {
            date: start + TimeDelta::days(day),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            adj_close: close,
            volume: 10_000.0 + 100.0 * day as f64,
        })
        .collect()
}

fn rising_closes(n: usize) -> Vec<f64> {
    (0..n).map(|i| 50.0 + i as f64 * 0.5).collect()
}

fn statements() -> FinancialStatementSet {
    FinancialStatementSet {
        ratios: FinancialRatios {
            period: "2023-12-31".to_string(),
            roe: Some(0.20),
            net_margin: Some(0.25),
            ..FinancialRatios::default()
        },
        income: IncomeStatement {
            period: "2023-12-31".to_string(),
            revenue: Some(100.0),
            operating_income: Some(18.0),
            ..IncomeStatement::default()
        },
        balance: BalanceSheet {
            period: "2023-12-31".to_string(),
            assets: BTreeMap::from([("total".to_string(), 300.0)]),
            liabilities: BTreeMap::from([("total".to_string(), 100.0)]),
            equity: BTreeMap::from([("total".to_string(), 200.0)]),
        },
        market: MarketRatios {
            p_e: Some(9.0),
            p_b: Some(1.1),
            dividend_yield: Some(0.05),
            ..MarketRatios::default()
        },
    }
}

fn static_provider(closes: &[f64]) -> StaticProvider {
    StaticProvider::new().with_company(company(), bars(closes), statements())
}

fn engine(provider: impl MarketDataProvider + 'static) -> AnalysisEngine {
    AnalysisEngine::new(Arc::new(provider), MarketConfig::default()).unwrap()
}

fn params() -> RunParams {
    RunParams::parse(TICKER, "2024-01-01", "2024-12-31").unwrap()
}

/// Provider whose every call fails
struct UnreachableProvider;

#[async_trait]
impl MarketDataProvider for UnreachableProvider {
    async fn list_companies(&self) -> analyst_market::Result<Vec<CompanyInfo>> {
        Err(MarketError::provider("upstream", "connection refused"))
    }

    async fn quotes(
        &self,
        _ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> analyst_market::Result<Vec<PriceBar>> {
        Err(MarketError::provider("upstream", "connection refused"))
    }

    async fn financial_statements(
        &self,
        _company_id: &str,
    ) -> analyst_market::Result<FinancialStatementSet> {
        Err(MarketError::provider("upstream", "connection refused"))
    }
}

/// Static provider that counts upstream calls
#[derive(Default)]
struct CountingProvider {
    inner: StaticProvider,
    calls: AtomicUsize,
}

#[async_trait]
impl MarketDataProvider for CountingProvider {
    async fn list_companies(&self) -> analyst_market::Result<Vec<CompanyInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_companies().await
    }

    async fn quotes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> analyst_market::Result<Vec<PriceBar>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.quotes(ticker, start, end).await
    }

    async fn financial_statements(
        &self,
        company_id: &str,
    ) -> analyst_market::Result<FinancialStatementSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.financial_statements(company_id).await
    }
}

#[tokio::test]
async fn test_full_run_completes_every_stage() {
    let engine = engine(static_provider(&rising_closes(60)));

    let report = assert_ok!(engine.analyze_all(params()).await);

    assert!(report.is_complete());
    assert_eq!(report.plan, StageId::ALL.to_vec());
    let stages: Vec<StageId> = report.state.messages.iter().map(|m| m.stage).collect();
    assert_eq!(stages, StageId::ALL.to_vec());

    let recommendation = report.state.data.recommendation.as_ref().unwrap();
    assert_eq!(report.analysis, recommendation.analysis);
    // MACD, RSI, Bollinger, OBV + three fundamental categories + two sentiment reads
    assert_eq!(report.analysis.signals().len(), 9);
    assert!(recommendation.annualized_volatility.is_some());
}

#[tokio::test]
async fn test_root_failure_skips_dependents() {
    let engine = engine(UnreachableProvider);

    let report = assert_ok!(engine.analyze_all(params()).await);

    assert_eq!(report.errors.len(), 1);
    assert_eq!(
        report.error_for(StageId::MarketData),
        Some(&Error::data_unavailable("company listing", "connection refused"))
    );
    assert_eq!(
        report.outcome(StageId::MarketData),
        Some(StageOutcome::Failed)
    );
    for stage in [
        StageId::Technical,
        StageId::Fundamental,
        StageId::Sentiment,
        StageId::Risk,
    ] {
        assert_eq!(report.outcome(stage), Some(StageOutcome::Skipped));
    }
    assert!(report.analysis.signals().is_empty());
    assert_eq!(report.analysis.verdict(), Verdict::Neutral);
    assert!(report.state.messages.is_empty());
}

#[tokio::test]
async fn test_unknown_ticker_is_reported() {
    let engine = engine(static_provider(&rising_closes(60)));
    let params = RunParams::parse("NOPE3", "2024-01-01", "2024-12-31").unwrap();

    let report = assert_ok!(engine.analyze_all(params).await);

    assert_eq!(
        report.error_for(StageId::MarketData),
        Some(&Error::InvalidTicker("NOPE3".to_string()))
    );
}

#[tokio::test]
async fn test_requested_stage_pulls_in_root() {
    let engine = engine(static_provider(&rising_closes(60)));

    let report = assert_ok!(engine.analyze(params(), &[StageId::Fundamental]).await);

    assert_eq!(report.plan, vec![StageId::MarketData, StageId::Fundamental]);
    assert!(report.state.data.technical.is_none());

    let fundamental = report.state.data.fundamental.as_ref().unwrap();
    let profitability = fundamental
        .signals()
        .iter()
        .find(|s| s.name() == "Profitability")
        .unwrap();
    assert_eq!(profitability.verdict(), Verdict::Bullish);
    assert_eq!(profitability.confidence(), Some(1.0));
}

#[tokio::test]
async fn test_macd_crossing_through_pipeline() {
    // Steady decline then a sharp rebound on the last session.
    let mut closes: Vec<f64> = (0..29).map(|i| 100.0 - f64::from(i)).collect();
    closes.push(90.0);
    let engine = engine(static_provider(&closes));

    let report = assert_ok!(engine.analyze(params(), &[StageId::Technical]).await);

    let technical = report.state.data.technical.as_ref().unwrap();
    let macd = technical
        .signals()
        .iter()
        .find(|s| s.name() == "MACD")
        .unwrap();
    assert_eq!(macd.verdict(), Verdict::Bullish);
}

#[tokio::test]
async fn test_reasoning_can_be_turned_off() {
    let engine = engine(static_provider(&rising_closes(60)));

    let report = assert_ok!(
        engine
            .analyze_all(params().with_show_reasoning(false))
            .await
    );

    assert!(report.is_complete());
    assert!(
        report
            .state
            .messages
            .iter()
            .all(|m| m.stage != StageId::MarketData && m.reasoning.is_empty())
    );
    // Analyses are still recorded in full.
    assert_eq!(report.analysis.signals().len(), 9);
}

#[tokio::test]
async fn test_repeated_runs_reuse_cached_data() {
    let provider = Arc::new(CountingProvider {
        inner: static_provider(&rising_closes(60)),
        ..CountingProvider::default()
    });
    let engine = AnalysisEngine::new(provider.clone(), MarketConfig::default()).unwrap();

    let first = assert_ok!(engine.analyze_all(params()).await);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);

    let second = assert_ok!(engine.analyze_all(params()).await);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);

    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.analysis, second.analysis);
}
