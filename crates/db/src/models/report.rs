//! Durable analysis report rows.

use serde::Serialize;
use sqlx::FromRow;
use quickform_core::types::Timestamp;

/// A row from the `analysis_reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnalysisReport {
    pub job_id: String,
    pub report: String,
    pub generated_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
