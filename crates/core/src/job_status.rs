//! Observable state of a background analysis job.
//!
//! A [`JobRecord`] is what the progress store holds; a [`JobStatusView`] is
//! what a polling client receives. Records are only built through the
//! constructors below so that `result` exists only on completed jobs and
//! `error_detail` only on failed ones.

use serde::Serialize;

use crate::types::JobId;

/// Progress reported when a job has been accepted but not yet dispatched.
pub const PROGRESS_ACCEPTED: u8 = 0;

/// Progress reported once the model call is under way.
pub const PROGRESS_WORKING: u8 = 1;

/// Progress reported for a finished job.
pub const PROGRESS_DONE: u8 = 100;

pub const MSG_PREPARING: &str = "Preparing analysis";
pub const MSG_WORKING: &str = "Model analysis running, this may take a few minutes";
pub const MSG_COMPLETED: &str = "Analysis complete";
pub const MSG_FAILED: &str = "Analysis failed";

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

impl JobState {
    /// `true` for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// One job's observable progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub status: JobState,
    pub progress_percent: u8,
    pub message: String,
    result: Option<String>,
    error_detail: Option<String>,
}

impl JobRecord {
    /// An in-flight record. `percent` is capped at 100.
    pub fn in_progress(job_id: impl Into<JobId>, percent: u8, message: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobState::InProgress,
            progress_percent: percent.min(PROGRESS_DONE),
            message: message.into(),
            result: None,
            error_detail: None,
        }
    }

    /// A completed record carrying the analysis result.
    pub fn completed(job_id: impl Into<JobId>, result: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobState::Completed,
            progress_percent: PROGRESS_DONE,
            message: MSG_COMPLETED.to_string(),
            result: Some(result.into()),
            error_detail: None,
        }
    }

    /// A failed record carrying a human-readable reason.
    pub fn failed(job_id: impl Into<JobId>, detail: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobState::Failed,
            progress_percent: PROGRESS_DONE,
            message: MSG_FAILED.to_string(),
            result: None,
            error_detail: Some(detail.into()),
        }
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == JobState::InProgress
    }

    /// Convert into the wire shape returned to polling clients.
    pub fn to_view(&self) -> JobStatusView {
        match self.status {
            JobState::NotStarted => JobStatusView::NotStarted,
            JobState::InProgress => JobStatusView::InProgress {
                progress: self.progress_percent,
                message: self.message.clone(),
            },
            JobState::Completed => JobStatusView::Completed {
                result: self.result.clone().unwrap_or_default(),
            },
            JobState::Failed => JobStatusView::Error {
                message: self
                    .error_detail
                    .clone()
                    .unwrap_or_else(|| MSG_FAILED.to_string()),
            },
        }
    }
}

/// Response body of `GET /jobs/{job_id}/status`.
///
/// ```text
/// {"status":"not_started"}
/// {"status":"in_progress","progress":1,"message":"..."}
/// {"status":"completed","result":"..."}
/// {"status":"error","message":"..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatusView {
    NotStarted,
    InProgress { progress: u8, message: String },
    Completed { result: String },
    Error { message: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
