//! Market data records consumed by the analysis stages
//!
//! Numeric fields reported by the upstream provider are `Option<f64>`: an
//! absent figure stays unknown and is never coerced to zero.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One daily quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: f64,
}

/// Quote history ordered by strictly increasing date
///
/// The ordering invariant is checked on construction and on
/// deserialization, so indicator code can rely on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PriceBar>", into = "Vec<PriceBar>")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Validate and wrap a list of bars
    ///
    /// An empty list is accepted here; callers that need data decide what an
    /// empty history means for them.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(Error::InvalidSeries(format!(
                "date {} follows {} (dates must be strictly increasing)",
                pair[1].date, pair[0].date
            )));
        }
        Ok(Self { bars })
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Adjusted closing prices in date order
    pub fn adj_closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.adj_close).collect()
    }

    /// Traded volumes in date order
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

impl TryFrom<Vec<PriceBar>> for PriceSeries {
    type Error = Error;

    fn try_from(bars: Vec<PriceBar>) -> Result<Self> {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<PriceBar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

/// Listed company as returned by the company lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    pub trade_name: String,
    /// Regulator-assigned identifier used to fetch statements
    pub company_id: String,
    pub ticker: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub subsector: Option<String>,
    #[serde(default)]
    pub segment: Option<String>,
    #[serde(default = "default_listed")]
    pub listed: bool,
}

fn default_listed() -> bool {
    true
}

/// Profitability ratios for a reporting period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialRatios {
    pub period: String,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub gross_margin: Option<f64>,
    pub ebit_margin: Option<f64>,
    pub net_margin: Option<f64>,
}

/// Income statement for a reporting period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub period: String,
    pub revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub net_income: Option<f64>,
    pub ebit: Option<f64>,
    pub ebitda: Option<f64>,
}

impl IncomeStatement {
    pub fn gross_margin(&self) -> Option<f64> {
        margin(self.gross_profit, self.revenue)
    }

    pub fn operating_margin(&self) -> Option<f64> {
        margin(self.operating_income, self.revenue)
    }

    pub fn net_margin(&self) -> Option<f64> {
        margin(self.net_income, self.revenue)
    }
}

// Undefined when either figure is unknown or revenue is zero.
fn margin(numerator: Option<f64>, revenue: Option<f64>) -> Option<f64> {
    match (numerator, revenue) {
        (Some(n), Some(r)) if r != 0.0 => Some(n / r),
        _ => None,
    }
}

/// Balance sheet as line items per section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub period: String,
    #[serde(default)]
    pub assets: BTreeMap<String, f64>,
    #[serde(default)]
    pub liabilities: BTreeMap<String, f64>,
    #[serde(default)]
    pub equity: BTreeMap<String, f64>,
}

impl BalanceSheet {
    pub fn total_assets(&self) -> Option<f64> {
        total(&self.assets)
    }

    pub fn total_liabilities(&self) -> Option<f64> {
        total(&self.liabilities)
    }

    pub fn total_equity(&self) -> Option<f64> {
        total(&self.equity)
    }
}

fn total(items: &BTreeMap<String, f64>) -> Option<f64> {
    if items.is_empty() {
        None
    } else {
        Some(items.values().sum())
    }
}

/// Market-derived valuation ratios
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketRatios {
    pub date: Option<NaiveDate>,
    pub market_cap: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub ev_ebit: Option<f64>,
    pub ev_ebitda: Option<f64>,
    pub p_e: Option<f64>,
    pub p_b: Option<f64>,
    pub dividend_yield: Option<f64>,
}

/// One company's statements for the latest reporting period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatementSet {
    pub ratios: FinancialRatios,
    pub income: IncomeStatement,
    pub balance: BalanceSheet,
    pub market: MarketRatios,
}

impl FinancialStatementSet {
    /// Net margin from the ratio record, falling back to the income statement
    pub fn net_margin(&self) -> Option<f64> {
        self.ratios.net_margin.or_else(|| self.income.net_margin())
    }
}
