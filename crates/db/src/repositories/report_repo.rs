//! Repository for the `analysis_reports` table.

use sqlx::PgPool;

use crate::models::report::AnalysisReport;

/// Column list for `analysis_reports` queries.
const COLUMNS: &str = "job_id, report, generated_at, created_at, updated_at";

/// Provides persistence for completed analysis reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Insert or replace the report for `job_id`.
    ///
    /// Repeating the call with the same inputs leaves one row with the same
    /// report text, so late or retried writes are harmless.
    pub async fn upsert(
        pool: &PgPool,
        job_id: &str,
        report: &str,
    ) -> Result<AnalysisReport, sqlx::Error> {
        let query = format!(
            "INSERT INTO analysis_reports (job_id, report) \
             VALUES ($1, $2) \
             ON CONFLICT (job_id) DO UPDATE \
             SET report = EXCLUDED.report, generated_at = NOW(), updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AnalysisReport>(&query)
            .bind(job_id)
            .bind(report)
            .fetch_one(pool)
            .await
    }

    /// Find the stored report for a job, if any.
    pub async fn find_by_job_id(
        pool: &PgPool,
        job_id: &str,
    ) -> Result<Option<AnalysisReport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM analysis_reports WHERE job_id = $1");
        sqlx::query_as::<_, AnalysisReport>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }
}
