//! Evaluation submission DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::evaluation::Locale;

/// Request to evaluate a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitEvaluation {
    /// Extracted document text
    pub document: String,
    #[serde(default)]
    pub locale: Option<String>,
}

impl SubmitEvaluation {
    pub fn new(document: impl Into<String>, locale: Locale) -> Self {
        Self {
            document: document.into(),
            locale: Some(locale.as_str().to_string()),
        }
    }
}

/// Response to an accepted submission
///
/// Returned as soon as the job exists, long before it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: Uuid,
}
