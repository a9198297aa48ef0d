//! Upstream market data access
//!
//! [`MarketDataProvider`] is the narrow interface to the remote data source.
//! [`MarketData`] wraps a provider with the three TTL caches and turns empty
//! upstream answers into errors, so stages never see silently empty data.

use std::collections::HashMap;
use std::sync::Arc;

use analyst_core::{CompanyInfo, FinancialStatementSet, PriceBar, PriceSeries};
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::cache::{CacheKey, MarketDataCache};
use crate::error::{MarketError, Result};

/// Source of companies, quotes and financial statements
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Every listed company with its ticker and identifier
    async fn list_companies(&self) -> Result<Vec<CompanyInfo>>;

    /// Daily quotes for `ticker` between `start` and `end`, both inclusive
    async fn quotes(&self, ticker: &str, start: NaiveDate, end: NaiveDate)
    -> Result<Vec<PriceBar>>;

    /// Latest statement bundle for a company identifier
    async fn financial_statements(&self, company_id: &str) -> Result<FinancialStatementSet>;
}

/// Cached facade over a [`MarketDataProvider`]
#[derive(Clone)]
pub struct MarketData {
    provider: Arc<dyn MarketDataProvider>,
    cache: MarketDataCache,
}

impl MarketData {
    pub fn new(provider: Arc<dyn MarketDataProvider>, cache: MarketDataCache) -> Self {
        Self { provider, cache }
    }

    pub fn cache(&self) -> &MarketDataCache {
        &self.cache
    }

    /// Company listing, cached with the company TTL
    pub async fn companies(&self) -> Result<Vec<CompanyInfo>> {
        let key = CacheKey::new("all", "companies", ());
        self.cache
            .companies
            .get_or_fetch(key, || async {
                let companies = self
                    .provider
                    .list_companies()
                    .await
                    .map_err(|e| e.for_subject("company listing"))?;
                if companies.is_empty() {
                    return Err(MarketError::data_unavailable(
                        "company listing",
                        "provider returned no companies",
                    ));
                }
                info!("Fetched listing of {} companies", companies.len());
                Ok::<_, MarketError>(companies)
            })
            .await
    }

    /// Resolve a ticker (case-insensitive) to its company
    pub async fn company_for_ticker(&self, ticker: &str) -> Result<CompanyInfo> {
        let wanted = ticker.trim();
        self.companies()
            .await?
            .into_iter()
            .find(|company| company.ticker.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MarketError::InvalidTicker(ticker.to_string()))
    }

    /// Validated quote history for the inclusive date range
    ///
    /// An empty answer is reported as `DataUnavailable` and is not cached.
    pub async fn price_series(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        let ticker = ticker.trim().to_ascii_uppercase();
        let key = CacheKey::new(ticker.as_str(), "quotes", (start, end));
        self.cache
            .quotes
            .get_or_fetch(key, || async {
                let bars = self
                    .provider
                    .quotes(&ticker, start, end)
                    .await
                    .map_err(|e| e.for_subject(&ticker))?;
                if bars.is_empty() {
                    return Err(MarketError::data_unavailable(
                        ticker.as_str(),
                        format!("no quotes between {start} and {end}"),
                    ));
                }
                debug!("Fetched {} quotes for {}", bars.len(), ticker);
                Ok::<_, MarketError>(PriceSeries::new(bars)?)
            })
            .await
    }

    /// Statement bundle for a company identifier
    pub async fn financial_statements(&self, company_id: &str) -> Result<FinancialStatementSet> {
        let key = CacheKey::new(company_id, "statements", ());
        self.cache
            .statements
            .get_or_fetch(key, || async {
                let statements = self
                    .provider
                    .financial_statements(company_id)
                    .await
                    .map_err(|e| e.for_subject(company_id))?;
                debug!(
                    "Fetched statements for company {} (period {})",
                    company_id, statements.ratios.period
                );
                Ok::<_, MarketError>(statements)
            })
            .await
    }
}

/// Provider serving fixed in-memory data
///
/// Useful for demos and tests. Quotes are filtered to the requested range;
/// unknown company identifiers are rejected.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    companies: Vec<CompanyInfo>,
    quotes: HashMap<String, Vec<PriceBar>>,
    statements: HashMap<String, FinancialStatementSet>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a company with its quote history and statements
    pub fn with_company(
        mut self,
        company: CompanyInfo,
        quotes: Vec<PriceBar>,
        statements: FinancialStatementSet,
    ) -> Self {
        self.quotes.insert(company.ticker.to_ascii_uppercase(), quotes);
        self.statements.insert(company.company_id.clone(), statements);
        self.companies.push(company);
        self
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    async fn list_companies(&self) -> Result<Vec<CompanyInfo>> {
        Ok(self.companies.clone())
    }

    async fn quotes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        Ok(self
            .quotes
            .get(&ticker.to_ascii_uppercase())
            .map(|bars| {
                bars.iter()
                    .filter(|bar| bar.date >= start && bar.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn financial_statements(&self, company_id: &str) -> Result<FinancialStatementSet> {
        self.statements
            .get(company_id)
            .cloned()
            .ok_or_else(|| MarketError::InvalidCompanyIdentifier(company_id.to_string()))
    }
}
