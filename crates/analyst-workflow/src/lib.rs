//! Pipeline orchestration for the analysis stages
//!
//! [`plan`] turns a set of requested stages into an execution order over the
//! static [`StageId`](analyst_core::StageId) dependency graph, and
//! [`Pipeline`] runs that plan one stage at a time, isolating failures and
//! collecting them in a [`RunReport`].

pub mod graph;
pub mod pipeline;
pub mod report;

// Re-export for convenience
pub use graph::plan;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use report::{RunReport, StageError, StageOutcome};
