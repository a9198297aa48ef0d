//! Core abstractions for the analysis pipeline
//!
//! This crate defines the types every stage of the pipeline agrees on:
//!
//! - [`AnalysisState`]: the context threaded through the pipeline, with a
//!   right-biased, order-preserving merge
//! - [`Signal`] and [`AggregatedAnalysis`]: ternary opinions and the single
//!   majority-rule [`aggregate`] function that combines them
//! - market data records ([`PriceSeries`], [`FinancialStatementSet`], ...)
//! - [`StageId`] and the [`Stage`] trait implemented by every pipeline stage

pub mod error;
pub mod signal;
pub mod stage;
pub mod state;
pub mod types;

pub use error::{Error, Result};
pub use signal::{Action, AggregatedAnalysis, Recommendation, Signal, Verdict, aggregate};
pub use stage::{Stage, StageId};
pub use state::{AnalysisData, AnalysisState, RunMetadata, RunParams, StageMessage};
pub use types::{
    BalanceSheet, CompanyInfo, FinancialRatios, FinancialStatementSet, IncomeStatement,
    MarketRatios, PriceBar, PriceSeries,
};
