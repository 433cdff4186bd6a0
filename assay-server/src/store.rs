//! Job Store
//!
//! Single source of truth for evaluation jobs. Records live in memory only
//! and are evicted once they have been idle for longer than the TTL.
//!
//! Every mutation and every sweep takes the write lock, so an update and an
//! eviction of the same job never interleave. Reads share the read lock and
//! return cloned snapshots.
//!
//! Mutations against a missing or already terminal job are ignored and
//! logged; they never fail the caller.

use assay_core::domain::evaluation::{Evaluation, Locale};
use assay_core::domain::job::{Job, JobStatus, Progress};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// In-memory registry of evaluation jobs
#[derive(Debug)]
pub struct JobStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
    ttl: Duration,
}

impl JobStore {
    /// Creates an empty store whose jobs expire after `ttl` of inactivity
    pub fn new(ttl: Duration) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Registers a new job at 0% on its first stage
    pub fn create(&self, first_stage: &str, locale: Locale) -> Uuid {
        let mut jobs = self.write();

        let mut id = Uuid::new_v4();
        while jobs.contains_key(&id) {
            id = Uuid::new_v4();
        }

        jobs.insert(id, Job::new(id, first_stage, locale));
        info!("Created job {}", id);

        id
    }

    /// Records a progress checkpoint and moves the job to `processing`
    ///
    /// Checkpoints below the current percent are dropped so that progress
    /// never goes backwards.
    pub fn update_progress(&self, id: Uuid, stage: &str, percent: u8) -> bool {
        self.mutate(id, "update progress", |job| {
            let percent = percent.min(100);
            if percent < job.progress.percent {
                warn!(
                    "Ignoring progress regression for job {}: {}% -> {}%",
                    id, job.progress.percent, percent
                );
                return false;
            }

            job.status = JobStatus::Processing;
            job.progress = Progress::new(stage, percent);
            debug!("Job {}: {} ({}%)", id, stage, percent);
            true
        })
    }

    /// Marks the job `completed` with its evaluation
    pub fn set_result(&self, id: Uuid, evaluation: Evaluation) -> bool {
        self.mutate(id, "set result", |job| {
            job.status = JobStatus::Completed;
            job.progress.percent = 100;
            job.result = Some(evaluation);
            info!("Job {} completed successfully", id);
            true
        })
    }

    /// Marks the job `failed` with a description of what went wrong
    pub fn set_error(&self, id: Uuid, message: impl Into<String>) -> bool {
        let message = message.into();
        self.mutate(id, "set error", |job| {
            info!("Job {} failed: {}", id, message);
            job.status = JobStatus::Failed;
            job.error = Some(message);
            true
        })
    }

    /// Returns a snapshot of the job, if it still exists
    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.read().get(&id).cloned()
    }

    /// Returns snapshots of every live job, newest first
    pub fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.read().values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Evicts every job idle for longer than the TTL
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    /// Evicts every job idle for longer than the TTL as of `now`
    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut jobs = self.write();
        let before = jobs.len();

        jobs.retain(|_, job| !self.is_expired(job, now));

        let cleaned = before - jobs.len();
        if cleaned > 0 {
            info!("Cleaned up {} expired job(s)", cleaned);
        }
        cleaned
    }

    /// Starts the periodic sweep for the lifetime of the process
    ///
    /// The returned handle should be aborted at shutdown.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                store.sweep();
            }
        })
    }

    fn is_expired(&self, job: &Job, now: DateTime<Utc>) -> bool {
        // A negative age (clock skew) never counts as expired
        (now - job.updated_at)
            .to_std()
            .map(|age| age > self.ttl)
            .unwrap_or(false)
    }

    /// Applies `apply` to a live, non-terminal job and bumps `updated_at`
    /// when it reports a change
    fn mutate(&self, id: Uuid, operation: &str, apply: impl FnOnce(&mut Job) -> bool) -> bool {
        let mut jobs = self.write();

        let Some(job) = jobs.get_mut(&id) else {
            warn!("Cannot {}: job {} not found", operation, id);
            return false;
        };

        if job.is_terminal() {
            warn!(
                "Cannot {}: job {} is already {}",
                operation, id, job.status
            );
            return false;
        }

        let changed = apply(job);
        if changed {
            job.updated_at = Utc::now();
        }
        changed
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Uuid, Job>> {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Uuid, Job>> {
        self.jobs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const FIRST: &str = "document-structure-extraction";

    fn store() -> JobStore {
        JobStore::new(Duration::from_secs(600))
    }

    fn evaluation() -> Evaluation {
        Evaluation {
            outputs: vec![],
            locale: Locale::En,
            evaluated_at: Utc::now(),
            guideline_version: "v6.3".to_string(),
        }
    }

    #[test]
    fn test_created_job_snapshot() {
        let store = store();
        let id = store.create(FIRST, Locale::En);

        let job = store.get(id).unwrap();
        assert_eq!(job.id, id);
        assert_eq!(job.status, JobStatus::Created);
        assert_eq!(job.progress, Progress::new(FIRST, 0));
        assert!(job.result.is_none());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_progress_moves_job_to_processing() {
        let store = store();
        let id = store.create(FIRST, Locale::En);

        assert!(store.update_progress(id, FIRST, 0));
        assert_eq!(store.get(id).unwrap().status, JobStatus::Processing);

        assert!(store.update_progress(id, "change-classification", 17));
        let job = store.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, Progress::new("change-classification", 17));
        assert!(job.updated_at >= job.created_at);
    }

    #[test]
    fn test_progress_regression_is_ignored() {
        let store = store();
        let id = store.create(FIRST, Locale::En);
        store.update_progress(id, "risk-assessment", 67);

        assert!(!store.update_progress(id, "change-classification", 17));
        assert_eq!(store.get(id).unwrap().progress.percent, 67);
    }

    #[test]
    fn test_result_completes_job_at_full_progress() {
        let store = store();
        let id = store.create(FIRST, Locale::En);
        store.update_progress(id, "report-synthesis", 83);

        assert!(store.set_result(id, evaluation()));
        let job = store.get(id).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress.percent, 100);
        assert!(job.result.is_some());
        assert!(job.error.is_none());
    }

    #[test]
    fn test_completed_job_is_absorbing() {
        let store = store();
        let id = store.create(FIRST, Locale::En);
        store.set_result(id, evaluation());
        let before = store.get(id).unwrap();

        assert!(!store.update_progress(id, FIRST, 100));
        assert!(!store.set_error(id, "late failure"));
        assert!(!store.set_result(id, evaluation()));

        assert_eq!(store.get(id).unwrap(), before);
    }

    #[test]
    fn test_failed_job_is_absorbing() {
        let store = store();
        let id = store.create(FIRST, Locale::En);
        store.update_progress(id, "change-classification", 17);
        store.set_error(id, "stage 'change-classification' failed: quota exceeded");
        let before = store.get(id).unwrap();

        assert!(!store.set_result(id, evaluation()));
        assert!(!store.update_progress(id, "report-synthesis", 100));
        assert!(!store.set_error(id, "another"));

        let after = store.get(id).unwrap();
        assert_eq!(after, before);
        assert_eq!(after.status, JobStatus::Failed);
        assert!(after.result.is_none());
        assert_eq!(
            after.error.as_deref(),
            Some("stage 'change-classification' failed: quota exceeded")
        );
    }

    #[test]
    fn test_mutating_unknown_job_is_a_no_op() {
        let store = store();
        let id = Uuid::new_v4();

        assert!(!store.update_progress(id, FIRST, 10));
        assert!(!store.set_result(id, evaluation()));
        assert!(!store.set_error(id, "nope"));
        assert!(store.get(id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_evicts_only_idle_jobs() {
        let store = store();
        let stale = store.create(FIRST, Locale::En);
        let now = Utc::now();

        // Not yet past the TTL
        assert_eq!(store.sweep_at(now + chrono::Duration::seconds(599)), 0);
        assert!(store.get(stale).is_some());

        assert_eq!(store.sweep_at(now + chrono::Duration::seconds(601)), 1);
        assert!(store.get(stale).is_none());
    }

    #[test]
    fn test_sweep_evicts_regardless_of_status() {
        let store = store();
        let done = store.create(FIRST, Locale::En);
        let running = store.create(FIRST, Locale::En);
        store.set_result(done, evaluation());
        store.update_progress(running, "risk-assessment", 67);

        let later = Utc::now() + chrono::Duration::seconds(601);
        assert_eq!(store.sweep_at(later), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_uses_last_update_time() {
        let store = JobStore::new(Duration::from_millis(50));
        let id = store.create(FIRST, Locale::En);
        let created = store.get(id).unwrap().created_at;

        std::thread::sleep(Duration::from_millis(30));
        store.update_progress(id, FIRST, 5);
        let updated = store.get(id).unwrap().updated_at;
        assert!(updated > created);

        // Past the TTL measured from creation, but not from the last update
        let probe = created + chrono::Duration::milliseconds(60);
        assert!(probe - updated < chrono::Duration::milliseconds(50));
        assert_eq!(store.sweep_at(probe), 0);
    }

    #[test]
    fn test_concurrent_creates_yield_distinct_ids() {
        let store = Arc::new(store());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..50)
                        .map(|_| store.create(FIRST, Locale::En))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let ids: HashSet<Uuid> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(ids.len(), 400);
        assert_eq!(store.len(), 400);
    }

    #[test]
    fn test_list_returns_newest_first() {
        let store = store();
        let first = store.create(FIRST, Locale::En);
        std::thread::sleep(Duration::from_millis(2));
        let second = store.create(FIRST, Locale::Ar);

        let ids: Vec<Uuid> = store.list().into_iter().map(|job| job.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn test_sweeper_task_evicts_in_background() {
        let store = Arc::new(JobStore::new(Duration::from_millis(20)));
        let id = store.create(FIRST, Locale::En);

        let sweeper = store.spawn_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        sweeper.abort();

        assert!(store.get(id).is_none());
    }
}
