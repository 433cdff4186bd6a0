//! Progress Stream
//!
//! Turns a job's record into an ordered sequence of stream messages by
//! polling the store. The sequence is monotone in percent and ends with
//! exactly one terminal message: done, error, or expired.
//!
//! Polling lives inside the returned stream, so dropping the stream (for
//! instance when the client disconnects) stops it without leaving a task
//! behind.

use assay_core::domain::job::JobStatus;
use assay_core::dto::stream::StreamMessage;
use async_stream::stream;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_stream::Stream;
use tracing::debug;
use uuid::Uuid;

use crate::store::JobStore;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Job {0} not found")]
    NotFound(Uuid),
}

/// Opens a progress stream for an existing job
///
/// Fails up front when the job is unknown; a job evicted after this point
/// yields an expired message instead.
pub fn subscribe(
    store: Arc<JobStore>,
    job_id: Uuid,
    poll_interval: Duration,
) -> Result<impl Stream<Item = StreamMessage> + Send + 'static, StreamError> {
    if store.get(job_id).is_none() {
        return Err(StreamError::NotFound(job_id));
    }

    debug!("Opening progress stream for job {}", job_id);

    Ok(stream! {
        let mut high_water: Option<u8> = None;

        loop {
            let job = match store.get(job_id) {
                Some(job) => job,
                None => {
                    debug!("Job {} disappeared while streaming", job_id);
                    yield StreamMessage::expired();
                    break;
                }
            };

            // Progress first, so a job that finished between polls still
            // reports its final percent before the terminal message
            let percent = job.progress.percent;
            if high_water.is_none_or(|seen| percent > seen) {
                high_water = Some(percent);
                yield StreamMessage::progress(job.progress.clone());
            }

            match job.status {
                JobStatus::Completed => {
                    match job.result {
                        Some(evaluation) => yield StreamMessage::done(evaluation),
                        None => yield StreamMessage::failed("Evaluation finished without a result"),
                    }
                    break;
                }
                JobStatus::Failed => {
                    let message = job.error.unwrap_or_else(|| "Evaluation failed".to_string());
                    yield StreamMessage::failed(message);
                    break;
                }
                JobStatus::Created | JobStatus::Processing => {}
            }

            tokio::time::sleep(poll_interval).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assay_core::domain::evaluation::{Evaluation, Locale};
    use assay_core::domain::job::Progress;
    use chrono::Utc;
    use tokio_stream::StreamExt;

    const POLL: Duration = Duration::from_millis(5);

    fn store() -> Arc<JobStore> {
        Arc::new(JobStore::new(Duration::from_secs(600)))
    }

    fn evaluation() -> Evaluation {
        Evaluation {
            outputs: Vec::new(),
            locale: Locale::En,
            evaluated_at: Utc::now(),
            guideline_version: "v6.3".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_job_is_rejected() {
        let result = subscribe(store(), Uuid::new_v4(), POLL);
        assert!(matches!(result, Err(StreamError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_already_completed_job_reports_final_percent_then_done() {
        let store = store();
        let id = store.create("document-structure-extraction", Locale::En);
        store.update_progress(id, "report-synthesis", 83);
        store.set_result(id, evaluation());

        let messages: Vec<StreamMessage> = subscribe(store, id, POLL).unwrap().collect().await;

        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0],
            StreamMessage::progress(Progress::new("report-synthesis", 100))
        );
        assert!(matches!(messages[1], StreamMessage::Done(_)));
    }

    #[tokio::test]
    async fn test_failed_job_yields_its_error() {
        let store = store();
        let id = store.create("document-structure-extraction", Locale::En);
        store.set_error(id, "stage 'risk-assessment' failed: boom");

        let messages: Vec<StreamMessage> = subscribe(store, id, POLL).unwrap().collect().await;

        assert_eq!(
            messages,
            vec![
                StreamMessage::progress(Progress::new("document-structure-extraction", 0)),
                StreamMessage::failed("stage 'risk-assessment' failed: boom"),
            ]
        );
    }

    #[tokio::test]
    async fn test_progress_then_done_without_repeats() {
        let store = store();
        let id = store.create("document-structure-extraction", Locale::En);

        let writer = Arc::clone(&store);
        tokio::spawn(async move {
            for (stage, percent) in [
                ("change-classification", 17),
                ("requirement-compliance-check", 33),
                ("requirement-compliance-check", 33),
                ("risk-assessment", 67),
            ] {
                tokio::time::sleep(Duration::from_millis(20)).await;
                writer.update_progress(id, stage, percent);
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.set_result(id, evaluation());
        });

        let messages: Vec<StreamMessage> = subscribe(store, id, POLL).unwrap().collect().await;

        let percents: Vec<u8> = messages
            .iter()
            .filter_map(|m| match m {
                StreamMessage::Progress(p) => Some(p.percent),
                _ => None,
            })
            .collect();
        assert_eq!(percents.first(), Some(&0));
        assert!(percents.windows(2).all(|w| w[0] < w[1]));
        assert!(percents.contains(&67));
        assert_eq!(percents.last(), Some(&100));

        assert_eq!(messages.iter().filter(|m| m.is_terminal()).count(), 1);
        assert!(matches!(messages.last(), Some(StreamMessage::Done(_))));
    }

    #[tokio::test]
    async fn test_eviction_while_streaming_yields_expired() {
        let store = store();
        let id = store.create("document-structure-extraction", Locale::En);

        let mut stream = Box::pin(subscribe(Arc::clone(&store), id, POLL).unwrap());
        let first = stream.next().await.unwrap();
        assert!(matches!(first, StreamMessage::Progress(_)));

        let later = Utc::now() + chrono::Duration::seconds(3600);
        assert_eq!(store.sweep_at(later), 1);

        assert_eq!(stream.next().await, Some(StreamMessage::expired()));
        assert_eq!(stream.next().await, None);
    }
}
