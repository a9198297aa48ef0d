//! Basic analysis example
//!
//! Runs the full pipeline against an in-memory provider seeded with a
//! synthetic quote history, then prints the per-stage messages and the
//! final recommendation.
//!
//! To run this example:
//! ```bash
//! # Optional: override cache TTLs and the log format
//! export ANALYST_QUOTE_TTL_SECS=60
//! export ANALYST_LOG_FORMAT=json
//!
//! cargo run --example basic_analysis
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use analyst_core::{
    BalanceSheet, CompanyInfo, FinancialRatios, FinancialStatementSet, IncomeStatement,
    MarketRatios, PriceBar, RunParams,
};
use analyst_market::{AnalysisEngine, MarketConfig, StaticProvider};
use chrono::{NaiveDate, TimeDelta};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    analyst_utils::init_tracing()?;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or_else(|| anyhow::anyhow!("bad date"))?;
    let provider = StaticProvider::new().with_company(
        CompanyInfo {
            name: "Demo Energia SA".to_string(),
            trade_name: "DEMO ENERGIA".to_string(),
            company_id: "9512".to_string(),
            ticker: "DEMO3".to_string(),
            sector: Some("Utilities".to_string()),
            subsector: None,
            segment: None,
            listed: true,
        },
        synthetic_quotes(start, 120),
        statements(),
    );

    let config = MarketConfig::from_env()?;
    println!("=== Market Analysis ===\n");
    println!("Configuration:");
    println!("  - Quote cache TTL: {:?}", config.quote_ttl);
    println!("  - Statement cache TTL: {:?}", config.statement_ttl);
    println!(
        "  - Minimum action confidence: {}\n",
        config.min_action_confidence
    );

    let engine = AnalysisEngine::new(Arc::new(provider), config)?;
    let params = RunParams::parse("demo3", "2024-01-01", "2024-04-29")?;
    let report = engine.analyze_all(params).await?;

    println!("Run {} ({:?})\n", report.run_id, report.plan);
    for message in &report.state.messages {
        println!("[{}] {}", message.stage, message.summary);
        for line in &message.reasoning {
            println!("    {line}");
        }
    }

    for error in &report.errors {
        println!("! {}: {}", error.stage, error.error);
    }

    if let Some(recommendation) = &report.state.data.recommendation {
        println!(
            "\nRecommendation: {} (verdict {}, confidence {:.2})",
            recommendation.action,
            recommendation.analysis.verdict(),
            recommendation.analysis.confidence()
        );
        if let Some(volatility) = recommendation.annualized_volatility {
            println!("Annualized volatility: {:.1}%", volatility * 100.0);
        }
    }

    Ok(())
}

/// Gently rising prices with a weekly wobble and growing volume
fn synthetic_quotes(start: NaiveDate, days: i64) -> Vec<PriceBar> {
    (0..days)
        .map(|day| {
            let trend = 30.0 + 0.08 * day as f64;
            let wobble = ((day % 7) as f64 - 3.0) * 0.15;
            let close = trend + wobble;
            PriceBar {
                date: start + TimeDelta::days(day),
                open: close - 0.1,
                high: close + 0.4,
                low: close - 0.4,
                close,
                adj_close: close,
                volume: 1_000_000.0 + 5_000.0 * day as f64,
            }
        })
        .collect()
}

fn statements() -> FinancialStatementSet {
    FinancialStatementSet {
        ratios: FinancialRatios {
            period: "2023-12-31".to_string(),
            roe: Some(0.18),
            net_margin: Some(0.22),
            ..FinancialRatios::default()
        },
        income: IncomeStatement {
            period: "2023-12-31".to_string(),
            revenue: Some(10_000.0),
            operating_income: Some(1_900.0),
            net_income: Some(2_200.0),
            ..IncomeStatement::default()
        },
        balance: BalanceSheet {
            period: "2023-12-31".to_string(),
            assets: BTreeMap::from([
                ("current".to_string(), 12_000.0),
                ("non_current".to_string(), 28_000.0),
            ]),
            liabilities: BTreeMap::from([("total".to_string(), 18_000.0)]),
            equity: BTreeMap::from([("total".to_string(), 22_000.0)]),
        },
        market: MarketRatios {
            p_e: Some(11.5),
            p_b: Some(1.4),
            dividend_yield: Some(0.06),
            ..MarketRatios::default()
        },
    }
}
