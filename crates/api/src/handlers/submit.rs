//! Handlers for the `/submit` resource.
//!
//! Submissions are admitted per client by the [`AdmissionController`]
//! before the body is read or anything is written. Bodies may be JSON or
//! `application/x-www-form-urlencoded`.
//!
//! [`AdmissionController`]: crate::admission::AdmissionController

use std::collections::HashMap;

use axum::extract::{FromRequest, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::{Form, Json};
use chrono::Utc;
use quickform_core::admission::Admission;
use quickform_db::models::submission::{NewSubmission, Submission};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::client_key::ClientKey;
use crate::response::DataResponse;
use crate::state::AppState;

/// Submissions returned by the preview endpoint.
const RECENT_LIMIT: i64 = 3;

/// Body of a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitAccepted {
    pub status: &'static str,
    pub message: &'static str,
}

/// Latest submissions for a resource.
#[derive(Debug, Serialize)]
pub struct RecentSubmissions {
    pub resource_id: String,
    pub total_submissions: i64,
    pub submissions: Vec<Submission>,
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/submit/{resource_id}
///
/// Store one form submission. Returns 429 while the client is throttled;
/// every rejection is appended to the resource's rate-limit log. Throttled
/// clients get 429 whatever their body contains.
pub async fn submit_form(
    State(state): State<AppState>,
    client: ClientKey,
    Path(resource_id): Path<String>,
    request: Request,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();

    if let Admission::Reject(_) = state.admission.admit(client.as_str(), now).await {
        let notice = state.admission.rejection_notice(client.as_str(), now);
        if let Err(e) = state
            .submissions
            .append_rate_limit_notice(&resource_id, client.as_str(), &notice)
            .await
        {
            tracing::error!(
                resource_id = %resource_id,
                error = %e,
                "Failed to record rate-limit notice",
            );
        }
        return Err(AppError::RateLimited);
    }

    let data = decode_body(request).await?;
    let input = NewSubmission {
        resource_id,
        data,
        client_key: Some(client.0),
    };
    let submission = state.submissions.record_submission(&input).await?;

    tracing::info!(
        submission_id = submission.id,
        resource_id = %submission.resource_id,
        "Submission stored",
    );

    Ok(Json(SubmitAccepted {
        status: "success",
        message: "Submission received",
    }))
}

/// Decode a JSON or form-encoded body into a JSON value.
///
/// Form fields become a flat object of strings.
async fn decode_body(request: Request) -> AppResult<Value> {
    let is_form = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

    if is_form {
        let Form(fields) = Form::<HashMap<String, String>>::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let object = fields
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect();
        return Ok(Value::Object(object));
    }

    let Json(data) = Json::<Value>::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;
    Ok(data)
}

// ---------------------------------------------------------------------------
// Recent
// ---------------------------------------------------------------------------

/// GET /api/v1/submit/{resource_id}
///
/// The newest submissions (newest first) and the total count.
pub async fn recent_submissions(
    State(state): State<AppState>,
    Path(resource_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let submissions = state
        .submissions
        .recent_submissions(&resource_id, RECENT_LIMIT)
        .await?;
    let total_submissions = state.submissions.count_submissions(&resource_id).await?;

    Ok(Json(DataResponse {
        data: RecentSubmissions {
            resource_id,
            total_submissions,
            submissions,
        },
    }))
}
