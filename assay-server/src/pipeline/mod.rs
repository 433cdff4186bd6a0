//! Stage Pipeline
//!
//! Runs a fixed, ordered list of analysis stages over one document:
//! - Context: reference guidance fetched once per run and shared read-only
//! - Stage: one analysis step consuming all earlier outputs
//! - Plan: static percent checkpoints reported after each stage
//! - Runner: sequential execution, progress reporting, result assembly

mod context;
mod plan;
mod runner;
mod stage;

pub use context::{ContextProvider, ReferenceContext};
pub use plan::ProgressPlan;
pub use runner::{Pipeline, PipelineError, ProgressSink};
pub use stage::{Stage, StageInput, StageOutputs};
