//! Market data acquisition stage

use analyst_core::{AnalysisState, Error, Result, Stage, StageId, StageMessage};
use async_trait::async_trait;
use tracing::info;

use crate::provider::MarketData;

/// Root stage: resolves the ticker and fetches quotes and statements
///
/// Every other stage depends on what this one writes, so its failure ends
/// the run.
pub struct MarketDataAgent {
    data: MarketData,
}

impl MarketDataAgent {
    pub fn new(data: MarketData) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Stage for MarketDataAgent {
    fn id(&self) -> StageId {
        StageId::MarketData
    }

    fn name(&self) -> &str {
        "MarketDataAgent"
    }

    async fn run(&self, state: &AnalysisState) -> Result<AnalysisState> {
        let id = self.id();
        let ticker = state.data.required_ticker(id)?;
        let start = state
            .data
            .start_date
            .ok_or_else(|| Error::missing_dependency(id, "start_date"))?;
        let end = state
            .data
            .end_date
            .ok_or_else(|| Error::missing_dependency(id, "end_date"))?;

        let company = self.data.company_for_ticker(ticker).await?;
        let quotes = self.data.price_series(&company.ticker, start, end).await?;
        let financials = self.data.financial_statements(&company.company_id).await?;

        info!(
            "Fetched {} quotes for {} ({}) and statements for period {}",
            quotes.len(),
            company.ticker,
            company.name,
            financials.ratios.period
        );

        let mut delta = AnalysisState::new();
        if state.show_reasoning() {
            delta = delta.with_message(
                StageMessage::new(
                    id,
                    format!(
                        "Fetched {} quotes for {} from {start} to {end}",
                        quotes.len(),
                        company.ticker
                    ),
                )
                .with_reasoning(vec![
                    format!("Company: {} (identifier {})", company.name, company.company_id),
                    format!("Statements period: {}", financials.ratios.period),
                ]),
            );
        }

        delta.data.company = Some(company);
        delta.data.quotes = Some(quotes);
        delta.data.financials = Some(financials);
        Ok(delta)
    }
}
