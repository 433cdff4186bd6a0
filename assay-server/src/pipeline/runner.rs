//! Pipeline runner
//!
//! Executes stages strictly in declaration order. Every stage runs exactly
//! once; the first failure aborts the run and no later stage is invoked.

use assay_core::domain::evaluation::{Evaluation, Locale};
use assay_core::domain::stage::StageId;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use super::context::ContextProvider;
use super::plan::ProgressPlan;
use super::stage::{Stage, StageInput, StageOutputs};

/// Receives `(stage, percent)` checkpoints while a pipeline runs
pub trait ProgressSink: Send + Sync {
    fn report(&self, stage: StageId, percent: u8);
}

/// Reasons a pipeline run (or its construction) can fail
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline has no stages")]
    Empty,

    #[error("invalid pipeline: {0}")]
    InvalidPlan(String),

    #[error("failed to load reference context: {0}")]
    Context(String),

    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: StageId, message: String },

    #[error("evaluation timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("evaluation task aborted: {0}")]
    Aborted(String),
}

/// Ordered list of stages plus the context they share
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
    plan: ProgressPlan,
    context: Arc<dyn ContextProvider>,
    guideline_version: String,
}

impl Pipeline {
    /// Creates a pipeline with evenly spaced progress checkpoints
    pub fn new(
        stages: Vec<Arc<dyn Stage>>,
        context: Arc<dyn ContextProvider>,
    ) -> Result<Self, PipelineError> {
        let plan = ProgressPlan::even(stages.len().max(1))?;
        Self::with_plan(stages, context, plan)
    }

    /// Creates a pipeline with an explicit checkpoint per stage
    pub fn with_plan(
        stages: Vec<Arc<dyn Stage>>,
        context: Arc<dyn ContextProvider>,
        plan: ProgressPlan,
    ) -> Result<Self, PipelineError> {
        if stages.is_empty() {
            return Err(PipelineError::Empty);
        }

        if plan.len() != stages.len() {
            return Err(PipelineError::InvalidPlan(format!(
                "{} checkpoint(s) for {} stage(s)",
                plan.len(),
                stages.len()
            )));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = stages.iter().map(|s| s.id()).find(|id| !seen.insert(*id)) {
            return Err(PipelineError::InvalidPlan(format!(
                "stage '{}' declared twice",
                duplicate
            )));
        }

        Ok(Self {
            stages,
            plan,
            context,
            guideline_version: "unversioned".to_string(),
        })
    }

    /// Sets the guideline version recorded in evaluations
    pub fn with_guideline_version(mut self, version: impl Into<String>) -> Self {
        self.guideline_version = version.into();
        self
    }

    /// Stage reported before anything has run
    pub fn first_stage(&self) -> StageId {
        self.stages[0].id()
    }

    pub fn stage_ids(&self) -> Vec<StageId> {
        self.stages.iter().map(|stage| stage.id()).collect()
    }

    /// Runs every stage in order and assembles the evaluation
    ///
    /// Reports `(first stage, 0)` before starting, then after each stage
    /// the stage about to run next (or the last stage, once done) with
    /// that boundary's checkpoint.
    pub async fn run(
        &self,
        document: &str,
        locale: Locale,
        sink: &dyn ProgressSink,
    ) -> Result<Evaluation, PipelineError> {
        let total = self.stages.len();
        sink.report(self.first_stage(), 0);

        debug!("Loading reference context");
        let context = self
            .context
            .fetch_reference_context()
            .await
            .map_err(|e| {
                error!("Failed to load reference context: {:#}", e);
                PipelineError::Context(format!("{:#}", e))
            })?;
        info!(
            "Loaded {} context segment(s) ({} characters)",
            context.segments().len(),
            context.char_count()
        );

        let mut outputs = StageOutputs::new();

        for (idx, stage) in self.stages.iter().enumerate() {
            let id = stage.id();
            info!("Executing stage {}/{}: {}", idx + 1, total, id);

            let input = StageInput {
                document,
                locale,
                outputs: &outputs,
                context: &context,
            };

            let output = stage.run(input).await.map_err(|e| {
                error!("Stage '{}' failed: {:#}", id, e);
                PipelineError::Stage {
                    stage: id,
                    message: format!("{:#}", e),
                }
            })?;

            outputs.push(id, output);
            debug!("Stage '{}' completed", id);

            let next = self.stages.get(idx + 1).map(|s| s.id()).unwrap_or(id);
            sink.report(next, self.plan.checkpoint(idx));
        }

        Ok(Evaluation {
            outputs: outputs.into_vec(),
            locale,
            evaluated_at: Utc::now(),
            guideline_version: self.guideline_version.clone(),
        })
    }
}
