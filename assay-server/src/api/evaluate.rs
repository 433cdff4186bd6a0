//! Evaluation API Handlers
//!
//! Submission, progress streaming and job inspection.

use assay_core::domain::evaluation::Locale;
use assay_core::domain::job::Job;
use assay_core::dto::evaluate::{SubmitEvaluation, SubmitResponse};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderName, StatusCode, header},
    response::{
        IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
};
use serde::Deserialize;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::state::{AppState, SubmissionLimits};
use crate::stream;

// =============================================================================
// Submission
// =============================================================================

/// POST /api/evaluate
/// Accept a document and start its evaluation in the background
pub async fn submit_evaluation(
    State(state): State<AppState>,
    body: Result<Json<SubmitEvaluation>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let Json(req) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let (document, locale) = validate_submission(req, &state.limits)?;

    tracing::info!(
        "Accepted document ({} bytes, locale {})",
        document.len(),
        locale
    );

    let (job_id, _) = state.driver.submit(document, locale);

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { job_id })))
}

/// Checks a submission against the limits, before any job exists
fn validate_submission(
    req: SubmitEvaluation,
    limits: &SubmissionLimits,
) -> ApiResult<(String, Locale)> {
    if req.document.trim().is_empty() {
        return Err(ApiError::BadRequest("No document provided".to_string()));
    }

    if req.document.len() > limits.max_document_bytes {
        return Err(ApiError::BadRequest(format!(
            "Document too large ({} bytes, limit {} bytes)",
            req.document.len(),
            limits.max_document_bytes
        )));
    }

    let chars = req.document.trim().chars().count();
    if chars < limits.min_document_chars {
        return Err(ApiError::BadRequest(format!(
            "Document too short ({} characters, at least {} required)",
            chars, limits.min_document_chars
        )));
    }

    let locale = match req.locale.as_deref() {
        None => Locale::default(),
        Some(raw) => raw.parse::<Locale>().map_err(ApiError::BadRequest)?,
    };

    Ok((req.document, locale))
}

// =============================================================================
// Progress Stream
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    #[serde(rename = "jobId")]
    pub job_id: Option<String>,
}

/// GET /api/evaluate/stream?jobId=<id>
/// Server-sent progress for one job, ending with a single terminal event
pub async fn stream_evaluation(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> ApiResult<impl IntoResponse> {
    let raw = query
        .job_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Job ID required".to_string()))?;

    let job_id = Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::NotFound(format!("Job {} not found", raw)))?;

    let messages = stream::subscribe(state.store.clone(), job_id, state.poll_interval)?;
    let events =
        messages.map(|msg| Event::default().event(msg.event_name()).json_data(&msg));

    tracing::debug!("Streaming progress for job {}", job_id);

    Ok((
        [
            (header::CACHE_CONTROL, "no-cache, no-transform"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Sse::new(events).keep_alive(KeepAlive::default()),
    ))
}

// =============================================================================
// Inspection
// =============================================================================

/// GET /api/evaluate/{id}
/// Current snapshot of one job
pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Job>> {
    tracing::debug!("Getting job: {}", id);

    state
        .store
        .get(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job {} not found", id)))
}

/// GET /api/jobs
/// All live jobs, newest first
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<Job>> {
    tracing::debug!("Listing all jobs");
    Json(state.store.list())
}
