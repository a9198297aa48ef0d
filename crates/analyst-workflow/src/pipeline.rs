//! Sequential, dependency-ordered stage execution

use std::collections::BTreeMap;
use std::sync::Arc;

use analyst_core::{AnalysisState, Error, Result, RunParams, Stage, StageId};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::graph::plan;
use crate::report::{RunReport, StageError, StageOutcome};

/// Runs registered stages in dependency order
///
/// Stages run one after another. A failing stage has its error recorded and
/// its output discarded; stages that do not depend on it still run. A stage
/// whose upstream output is absent fails with `MissingDependency` from the
/// state's `required_*` accessors before computing anything. When the
/// root stage fails nothing else can run, so the remaining stages are
/// skipped.
///
/// # Example
///
/// ```no_run
/// use analyst_core::{RunParams, StageId};
/// use analyst_workflow::Pipeline;
/// # use std::sync::Arc;
///
/// # async fn example(
/// #     market_data: Arc<dyn analyst_core::Stage>,
/// #     technical: Arc<dyn analyst_core::Stage>,
/// # ) -> analyst_core::Result<()> {
/// let pipeline = Pipeline::builder()
///     .stage(market_data)
///     .stage(technical)
///     .build()?;
///
/// let params = RunParams::parse("PETR4", "2024-01-01", "2024-06-30")?;
/// let report = pipeline.run(params, &[StageId::Technical]).await?;
/// println!("{} ({:.2})", report.analysis.verdict(), report.analysis.confidence());
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    stages: BTreeMap<StageId, Arc<dyn Stage>>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Identifiers of the registered stages, in canonical order
    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.keys().copied().collect()
    }

    /// Run the requested stages (plus the stages they require)
    ///
    /// Fails up front only when a planned stage is not registered; stage
    /// failures are reported inside the returned [`RunReport`].
    pub async fn run(&self, params: RunParams, requested: &[StageId]) -> Result<RunReport> {
        let order = plan(requested);
        if let Some(missing) = order.iter().find(|id| !self.stages.contains_key(id)) {
            return Err(Error::UnregisteredStage(*missing));
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("analysis_run", ticker = %params.ticker, run_id = %run_id);
        self.execute(params, order, run_id).instrument(span).await
    }

    async fn execute(
        &self,
        params: RunParams,
        order: Vec<StageId>,
        run_id: Uuid,
    ) -> Result<RunReport> {
        info!(
            "Starting analysis of {} from {} to {} ({} stage(s))",
            params.ticker,
            params.start_date,
            params.end_date,
            order.len()
        );

        let mut state = AnalysisState::from_params(&params, run_id);
        let mut outcomes = Vec::with_capacity(order.len());
        let mut errors: Vec<StageError> = Vec::new();
        let mut aborted = false;

        for &id in &order {
            if aborted {
                debug!("Skipping stage {} after root failure", id);
                outcomes.push((id, StageOutcome::Skipped));
                continue;
            }

            let Some(stage) = self.stages.get(&id) else {
                return Err(Error::UnregisteredStage(id));
            };

            let result = stage
                .run(&state)
                .instrument(info_span!("stage", stage = %id))
                .await;

            match result {
                Ok(delta) => {
                    debug!("Stage {} completed with {} message(s)", id, delta.messages.len());
                    state.merge_from(delta);
                    outcomes.push((id, StageOutcome::Completed));
                }
                Err(error) => {
                    warn!("Stage {} ({}) failed: {}", id, stage.name(), error);
                    errors.push(StageError { stage: id, error });
                    outcomes.push((id, StageOutcome::Failed));
                    if id.is_root() {
                        aborted = true;
                    }
                }
            }
        }

        let analysis = state.final_analysis();
        info!(
            "Analysis finished: {} with confidence {:.2} from {} signal(s), {} error(s)",
            analysis.verdict(),
            analysis.confidence(),
            analysis.signals().len(),
            errors.len()
        );

        Ok(RunReport {
            run_id,
            plan: order,
            outcomes,
            errors,
            state,
            analysis,
        })
    }
}

/// Builder for [`Pipeline`]
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<Arc<dyn Stage>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage
    pub fn stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Build the pipeline
    ///
    /// Rejects duplicate registrations and stages whose required upstream
    /// stage is not registered, so a broken graph is caught here rather than
    /// mid-run.
    pub fn build(self) -> Result<Pipeline> {
        let mut stages: BTreeMap<StageId, Arc<dyn Stage>> = BTreeMap::new();
        for stage in self.stages {
            let id = stage.id();
            if stages.insert(id, stage).is_some() {
                return Err(Error::DuplicateStage(id));
            }
        }

        for id in stages.keys() {
            if let Some(missing) = id.requires().iter().find(|up| !stages.contains_key(up)) {
                return Err(Error::UnregisteredStage(*missing));
            }
        }

        Ok(Pipeline { stages })
    }
}
