//! Stage contract and the output chain

use assay_core::domain::evaluation::{Locale, StageOutput};
use assay_core::domain::stage::StageId;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::context::ReferenceContext;

/// Everything a stage may read while it runs
#[derive(Debug, Clone, Copy)]
pub struct StageInput<'a> {
    /// The submitted document text
    pub document: &'a str,
    /// Language the findings should be written in
    pub locale: Locale,
    /// Outputs of every stage that already ran, in order
    pub outputs: &'a StageOutputs,
    /// Reference guidance fetched at pipeline start
    pub context: &'a ReferenceContext,
}

/// One analysis step of the pipeline
///
/// The pipeline never looks inside a stage's output; it only keeps it for
/// later stages and for the final evaluation.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Identifier reported in progress and used to key the output
    fn id(&self) -> StageId;

    /// Runs the stage, failing with a descriptive error
    async fn run(&self, input: StageInput<'_>) -> anyhow::Result<JsonValue>;
}

/// Append-only record of stage outputs for one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageOutputs {
    entries: Vec<StageOutput>,
}

impl StageOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, stage: StageId, output: JsonValue) {
        self.entries.push(StageOutput { stage, output });
    }

    /// Output of a stage that already ran
    pub fn get(&self, stage: StageId) -> Option<&JsonValue> {
        self.entries
            .iter()
            .find(|entry| entry.stage == stage)
            .map(|entry| &entry.output)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageOutput> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outputs as a JSON object keyed by stage identifier
    pub fn to_json(&self) -> JsonValue {
        let map = self
            .entries
            .iter()
            .map(|entry| (entry.stage.as_str().to_string(), entry.output.clone()))
            .collect::<serde_json::Map<_, _>>();
        JsonValue::Object(map)
    }

    pub(crate) fn into_vec(self) -> Vec<StageOutput> {
        self.entries
    }
}
