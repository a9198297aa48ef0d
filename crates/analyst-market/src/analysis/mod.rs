//! Deterministic scoring engines used by the stages

pub mod fundamental;
pub mod risk;
pub mod sentiment;
pub mod technical;

pub use fundamental::fundamental_signals;
pub use risk::{annualized_volatility, recommend};
pub use sentiment::sentiment_signals;
pub use technical::technical_signals;
