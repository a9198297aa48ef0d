//! Analysis engine: the pipeline wired to a market data provider

use std::sync::Arc;

use analyst_core::{RunParams, StageId};
use analyst_workflow::{Pipeline, RunReport};
use tracing::debug;

use crate::agents::{
    FundamentalAnalyzerAgent, MarketDataAgent, RiskManagerAgent, SentimentAnalyzerAgent,
    TechnicalAnalyzerAgent,
};
use crate::cache::MarketDataCache;
use crate::config::MarketConfig;
use crate::error::Result;
use crate::provider::{MarketData, MarketDataProvider};

/// Runs analyses for any ticker the provider knows about
///
/// The cache lives as long as the engine, so repeated runs for the same
/// ticker and range reuse fetched data until its TTL expires.
pub struct AnalysisEngine {
    pipeline: Pipeline,
    data: MarketData,
    config: MarketConfig,
}

impl AnalysisEngine {
    pub fn new(provider: Arc<dyn MarketDataProvider>, config: MarketConfig) -> Result<Self> {
        config.validate()?;

        let data = MarketData::new(provider, MarketDataCache::new(&config));
        let pipeline = Pipeline::builder()
            .stage(Arc::new(MarketDataAgent::new(data.clone())))
            .stage(Arc::new(TechnicalAnalyzerAgent::new(
                config.indicators.clone(),
            )))
            .stage(Arc::new(FundamentalAnalyzerAgent::new()))
            .stage(Arc::new(SentimentAnalyzerAgent::new(
                config.sentiment.clone(),
            )))
            .stage(Arc::new(RiskManagerAgent::new(config.min_action_confidence)))
            .build()?;

        debug!("Analysis engine ready with stages {:?}", pipeline.stage_ids());

        Ok(Self {
            pipeline,
            data,
            config,
        })
    }

    /// Run the requested stages plus whatever they depend on
    pub async fn analyze(&self, params: RunParams, stages: &[StageId]) -> Result<RunReport> {
        Ok(self.pipeline.run(params, stages).await?)
    }

    /// Run every stage
    pub async fn analyze_all(&self, params: RunParams) -> Result<RunReport> {
        self.analyze(params, &StageId::ALL).await
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn market_data(&self) -> &MarketData {
        &self.data
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use std::time::Duration;

    #[test]
    fn test_engine_registers_every_stage() {
        let engine = AnalysisEngine::new(
            Arc::new(StaticProvider::new()),
            MarketConfig::default(),
        )
        .unwrap();

        assert_eq!(engine.pipeline().stage_ids(), StageId::ALL.to_vec());
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let config = MarketConfig {
            quote_ttl: Duration::ZERO,
            ..MarketConfig::default()
        };

        let result = AnalysisEngine::new(Arc::new(StaticProvider::new()), config);
        assert!(result.is_err());
    }
}
