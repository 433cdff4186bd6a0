//! Evaluation endpoints

use assay_core::domain::job::Job;
use assay_core::dto::evaluate::{SubmitEvaluation, SubmitResponse};
use uuid::Uuid;

use crate::AssayClient;
use crate::error::Result;
use crate::stream::ProgressSubscription;

impl AssayClient {
    /// Submit a document for evaluation
    ///
    /// Returns as soon as the server has created the job.
    pub async fn submit(&self, req: &SubmitEvaluation) -> Result<SubmitResponse> {
        let url = format!("{}/api/evaluate", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        self.handle_response(response).await
    }

    /// Get the current snapshot of a job
    pub async fn get_job(&self, job_id: Uuid) -> Result<Job> {
        let url = format!("{}/api/evaluate/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List all live jobs, newest first
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let url = format!("{}/api/jobs", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Open the progress stream of a job
    pub async fn stream(&self, job_id: Uuid) -> Result<ProgressSubscription> {
        let url = format!("{}/api/evaluate/stream", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("jobId", job_id.to_string())])
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        let response = self.check_status(response).await?;
        tracing::debug!("Subscribed to progress of job {}", job_id);

        Ok(ProgressSubscription::new(response))
    }
}
