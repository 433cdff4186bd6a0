//! Progress stream messages
//!
//! Each server-sent event on the progress stream carries exactly one of
//! these as its JSON `data` payload:
//!
//! - `{"stage": ..., "percent": ...}`
//! - `{"done": true, "evaluation": {...}}`
//! - `{"error": true, "message": ...}` (with `"expired": true` when the job
//!   was evicted before finishing)

use serde::{Deserialize, Serialize};

use crate::domain::evaluation::Evaluation;
use crate::domain::job::Progress;

/// Message sent when a job disappears before reaching a terminal state
pub const EXPIRED_MESSAGE: &str = "Job expired or was cleaned up";

/// One update on a job's progress stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamMessage {
    Progress(Progress),
    Done(DoneMessage),
    Error(ErrorMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoneMessage {
    pub done: bool,
    pub evaluation: Evaluation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub error: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub expired: bool,
}

impl StreamMessage {
    pub fn progress(progress: Progress) -> Self {
        StreamMessage::Progress(progress)
    }

    pub fn done(evaluation: Evaluation) -> Self {
        StreamMessage::Done(DoneMessage {
            done: true,
            evaluation,
        })
    }

    pub fn failed(message: impl Into<String>) -> Self {
        StreamMessage::Error(ErrorMessage {
            error: true,
            message: message.into(),
            expired: false,
        })
    }

    pub fn expired() -> Self {
        StreamMessage::Error(ErrorMessage {
            error: true,
            message: EXPIRED_MESSAGE.to_string(),
            expired: true,
        })
    }

    /// Whether this message ends the stream
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamMessage::Progress(_))
    }

    /// SSE event name for this message
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamMessage::Progress(_) => "progress",
            StreamMessage::Done(_) => "done",
            StreamMessage::Error(ErrorMessage { expired: true, .. }) => "expired",
            StreamMessage::Error(_) => "error",
        }
    }
}
