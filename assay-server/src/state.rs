//! Shared handler state

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::driver::JobDriver;
use crate::store::JobStore;

/// Bounds applied to submitted documents before a job is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionLimits {
    pub max_document_bytes: usize,
    pub min_document_chars: usize,
}

impl From<&Config> for SubmissionLimits {
    fn from(config: &Config) -> Self {
        Self {
            max_document_bytes: config.max_document_bytes,
            min_document_chars: config.min_document_chars,
        }
    }
}

/// State handed to every HTTP handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JobStore>,
    pub driver: JobDriver,
    pub limits: SubmissionLimits,
    pub poll_interval: Duration,
}

impl AppState {
    pub fn new(driver: JobDriver, limits: SubmissionLimits, poll_interval: Duration) -> Self {
        Self {
            store: Arc::clone(driver.store()),
            driver,
            limits,
            poll_interval,
        }
    }
}
