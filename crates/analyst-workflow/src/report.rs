//! Outcome of a pipeline run

use analyst_core::{AggregatedAnalysis, AnalysisState, Error, StageId};
use serde::Serialize;
use uuid::Uuid;

/// What happened to one planned stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    /// Ran and its output was merged
    Completed,
    /// Ran and failed, or could not run because a required input was missing
    Failed,
    /// Not run because the root stage failed
    Skipped,
}

/// Stage-scoped failure recorded during a run
#[derive(Debug, Clone, PartialEq)]
pub struct StageError {
    pub stage: StageId,
    pub error: Error,
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Stages in execution order
    pub plan: Vec<StageId>,
    /// One entry per planned stage, in plan order
    pub outcomes: Vec<(StageId, StageOutcome)>,
    pub errors: Vec<StageError>,
    pub state: AnalysisState,
    /// Best-effort overall analysis
    pub analysis: AggregatedAnalysis,
}

impl RunReport {
    pub fn outcome(&self, stage: StageId) -> Option<StageOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == stage)
            .map(|(_, outcome)| *outcome)
    }

    /// Whether every planned stage completed
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
            && self
                .outcomes
                .iter()
                .all(|(_, outcome)| *outcome == StageOutcome::Completed)
    }

    /// Error recorded for `stage`, if any
    pub fn error_for(&self, stage: StageId) -> Option<&Error> {
        self.errors
            .iter()
            .find(|e| e.stage == stage)
            .map(|e| &e.error)
    }
}
