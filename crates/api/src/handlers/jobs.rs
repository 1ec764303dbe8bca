//! Handlers for the `/jobs` resource.
//!
//! Enqueuing returns as soon as the job is claimed; clients then poll
//! `/jobs/{job_id}/status` until a terminal state.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quickform_core::analysis::AnalysisJob;
use quickform_core::job_status::JobStatusView;
use serde::{Deserialize, Serialize};

use crate::engine::status::query_status;
use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /jobs/{job_id}`.
#[derive(Debug, Deserialize)]
pub struct EnqueueAnalysis {
    pub prompt: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub supersede: bool,
}

/// Acknowledgement returned for an accepted job.
#[derive(Debug, Serialize)]
pub struct EnqueuedJob {
    pub job_id: String,
    pub status_url: String,
}

// ---------------------------------------------------------------------------
// Enqueue
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs/{job_id}
///
/// Start an analysis. Returns 202 with the status URL, or 409 when the job
/// is already running and `supersede` is not set.
pub async fn enqueue_analysis(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(input): Json<EnqueueAnalysis>,
) -> AppResult<impl IntoResponse> {
    let job = AnalysisJob {
        job_id,
        prompt: input.prompt,
        provider: input.provider,
        supersede: input.supersede,
    };
    let job_id = state.runner.enqueue(job).await?;
    let status_url = format!("/api/v1/jobs/{job_id}/status");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: EnqueuedJob { job_id, status_url },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{job_id}/status
///
/// Always answers in the status shape, including storage failures (500
/// with `{"status":"error"}`), so pollers only need one parser.
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Response {
    let runner = &state.runner;
    match query_status(runner.progress(), runner.reports().as_ref(), &job_id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => {
            tracing::error!(job_id = %job_id, error = %e, "Failed to load job status");
            let view = JobStatusView::Error {
                message: "Failed to load job status".to_string(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(view)).into_response()
        }
    }
}
