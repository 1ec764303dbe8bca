//! Form submission rows and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use quickform_core::types::{DbId, Timestamp};

/// A row from the `form_submissions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Submission {
    pub id: DbId,
    pub resource_id: String,
    pub data: serde_json::Value,
    pub client_key: Option<String>,
    pub submitted_at: Timestamp,
}

/// DTO for inserting a submission.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubmission {
    pub resource_id: String,
    pub data: serde_json::Value,
    pub client_key: Option<String>,
}
