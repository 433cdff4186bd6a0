//! Job Driver
//!
//! Bridges the pipeline to the job store. A submission creates the job
//! synchronously and runs the pipeline on a background task; the caller
//! gets the job id back before any stage has started.

use assay_core::domain::evaluation::Locale;
use assay_core::domain::stage::StageId;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::pipeline::{Pipeline, PipelineError, ProgressSink};
use crate::store::JobStore;

/// Forwards pipeline checkpoints into the store for one job
struct StoreSink {
    store: Arc<JobStore>,
    job_id: Uuid,
}

impl ProgressSink for StoreSink {
    fn report(&self, stage: StageId, percent: u8) {
        self.store
            .update_progress(self.job_id, stage.as_str(), percent);
    }
}

/// Aborts the wrapped task when dropped
///
/// Ties the pipeline run to the task driving it: aborting the handle
/// returned by `JobDriver::submit` also stops the pipeline.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Starts evaluations and records their outcome
#[derive(Clone)]
pub struct JobDriver {
    store: Arc<JobStore>,
    pipeline: Arc<Pipeline>,
    timeout: Duration,
}

impl JobDriver {
    pub fn new(store: Arc<JobStore>, pipeline: Arc<Pipeline>, timeout: Duration) -> Self {
        Self {
            store,
            pipeline,
            timeout,
        }
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Creates a job and runs the pipeline for it in the background
    ///
    /// Whatever happens inside the run (error, panic, timeout), the job ends
    /// in a terminal state unless it was evicted first. Aborting the returned
    /// handle cancels the run and leaves the job where it was.
    pub fn submit(&self, document: String, locale: Locale) -> (Uuid, JoinHandle<()>) {
        let job_id = self
            .store
            .create(self.pipeline.first_stage().as_str(), locale);

        let driver = self.clone();
        let handle = tokio::spawn(async move {
            driver.drive(job_id, document, locale).await;
        });

        (job_id, handle)
    }

    async fn drive(self, job_id: Uuid, document: String, locale: Locale) {
        info!("Starting evaluation for job {}", job_id);

        let sink = StoreSink {
            store: Arc::clone(&self.store),
            job_id,
        };
        let pipeline = Arc::clone(&self.pipeline);

        // Runs on its own task so a panicking stage surfaces as a JoinError
        let mut task = AbortOnDrop(tokio::spawn(async move {
            pipeline.run(&document, locale, &sink).await
        }));

        let outcome = match tokio::time::timeout(self.timeout, &mut task.0).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(PipelineError::Aborted(join_error.to_string())),
            Err(_) => {
                task.0.abort();
                warn!(
                    "Evaluation for job {} exceeded {}s, aborting",
                    job_id,
                    self.timeout.as_secs()
                );
                Err(PipelineError::TimedOut(self.timeout))
            }
        };

        match outcome {
            Ok(evaluation) => {
                self.store.set_result(job_id, evaluation);
            }
            Err(e) => {
                error!("Evaluation for job {} failed: {}", job_id, e);
                self.store.set_error(job_id, e.to_string());
            }
        }
    }
}
