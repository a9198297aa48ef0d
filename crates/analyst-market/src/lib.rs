//! Market analysis stages
//!
//! This crate plugs concrete stages into the analysis pipeline:
//!
//! - Market data access through a [`MarketDataProvider`], cached per
//!   endpoint with separate TTLs ([`MarketDataCache`])
//! - Technical analysis (MACD, RSI, Bollinger Bands, OBV)
//! - Fundamental scoring (profitability, valuation, financial health)
//! - Price-action sentiment (momentum, volume pressure)
//! - A risk stage combining everything into a buy/sell/hold recommendation
//!
//! # Example
//!
//! ```rust,ignore
//! use analyst_core::RunParams;
//! use analyst_market::{AnalysisEngine, MarketConfig, StaticProvider};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = Arc::new(StaticProvider::new() /* .with_company(..) */);
//!     let engine = AnalysisEngine::new(provider, MarketConfig::from_env()?)?;
//!
//!     let params = RunParams::parse("PETR4", "2024-01-01", "2024-06-30")?;
//!     let report = engine.analyze_all(params).await?;
//!     println!("{}", report.analysis.verdict());
//!
//!     Ok(())
//! }
//! ```

pub mod agents;
pub mod analysis;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod provider;

pub use agents::{
    FundamentalAnalyzerAgent, MarketDataAgent, RiskManagerAgent, SentimentAnalyzerAgent,
    TechnicalAnalyzerAgent,
};
pub use cache::{CacheKey, MarketDataCache, TtlCache};
pub use config::{IndicatorSettings, MarketConfig, MarketConfigBuilder, SentimentSettings};
pub use engine::AnalysisEngine;
pub use error::{MarketError, Result};
pub use provider::{MarketData, MarketDataProvider, StaticProvider};
