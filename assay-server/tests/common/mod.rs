//! In-process fakes shared by the integration tests

#![allow(dead_code)]

use assay_core::domain::stage::StageId;
use assay_server::driver::JobDriver;
use assay_server::pipeline::{ContextProvider, Pipeline, ReferenceContext, Stage, StageInput};
use assay_server::store::JobStore;
use async_trait::async_trait;
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Echo the document back in the output
    Echo,
    Fail,
    /// Sleep before echoing
    Delay(Duration),
    Panic,
}

pub struct FakeStage {
    id: StageId,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl FakeStage {
    pub fn new(id: StageId, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            id,
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Stage for FakeStage {
    fn id(&self) -> StageId {
        self.id
    }

    async fn run(&self, input: StageInput<'_>) -> anyhow::Result<JsonValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            Behavior::Echo => {}
            Behavior::Fail => anyhow::bail!("{} could not parse the model response", self.id),
            Behavior::Delay(duration) => tokio::time::sleep(duration).await,
            Behavior::Panic => panic!("{} crashed", self.id),
        }

        Ok(json!({
            "document": input.document,
            "priorStages": input.outputs.len(),
        }))
    }
}

pub struct FakeContext {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeContext {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextProvider for FakeContext {
    async fn fetch_reference_context(&self) -> anyhow::Result<ReferenceContext> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("guidance index unavailable");
        }
        Ok(ReferenceContext::new(vec!["Variation guideline".to_string()]))
    }
}

/// Six stages in pipeline order, each with the given behavior
pub fn six_stages(behavior_of: impl Fn(usize) -> Behavior) -> Vec<Arc<FakeStage>> {
    StageId::ALL
        .iter()
        .enumerate()
        .map(|(i, id)| FakeStage::new(*id, behavior_of(i)))
        .collect()
}

pub struct Harness {
    pub store: Arc<JobStore>,
    pub driver: JobDriver,
    pub stages: Vec<Arc<FakeStage>>,
    pub context: Arc<FakeContext>,
}

pub fn harness(
    stages: Vec<Arc<FakeStage>>,
    context: Arc<FakeContext>,
    timeout: Duration,
) -> Harness {
    let store = Arc::new(JobStore::new(Duration::from_secs(600)));
    let pipeline = Pipeline::new(
        stages
            .iter()
            .map(|s| Arc::clone(s) as Arc<dyn Stage>)
            .collect(),
        Arc::clone(&context) as Arc<dyn ContextProvider>,
    )
    .unwrap();
    let driver = JobDriver::new(Arc::clone(&store), Arc::new(pipeline), timeout);

    Harness {
        store,
        driver,
        stages,
        context,
    }
}

/// A document long enough to pass submission limits
pub fn document(tag: &str) -> String {
    format!("{} {}", tag, "Variation application dossier text. ".repeat(8))
}
