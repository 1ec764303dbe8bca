//! Object-safe storage seams used by the analysis engine and the
//! submission endpoint.
//!
//! [`PgStore`] is the production implementation over the repositories.

use async_trait::async_trait;

use crate::models::submission::{NewSubmission, Submission};
use crate::repositories::{RateLimitLogRepo, ReportRepo, SubmissionRepo};
use crate::DbPool;

/// Failure of a durable read or write.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of completed analysis reports.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Store `report` for `job_id`. Idempotent for repeated identical calls.
    async fn persist_result(&self, job_id: &str, report: &str) -> Result<(), StoreError>;

    /// Load the stored report for `job_id`, if one exists.
    async fn load_persisted_result(&self, job_id: &str) -> Result<Option<String>, StoreError>;

    /// Whether the backing store is reachable.
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Durable home of form submissions and their rate-limit audit log.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn record_submission(&self, input: &NewSubmission) -> Result<Submission, StoreError>;

    /// Newest `limit` submissions for a resource, newest first.
    async fn recent_submissions(
        &self,
        resource_id: &str,
        limit: i64,
    ) -> Result<Vec<Submission>, StoreError>;

    async fn count_submissions(&self, resource_id: &str) -> Result<i64, StoreError>;

    /// Append a human-readable throttling notice to the resource's log.
    async fn append_rate_limit_notice(
        &self,
        resource_id: &str,
        client_key: &str,
        notice: &str,
    ) -> Result<(), StoreError>;
}

/// PostgreSQL-backed implementation of both store traits.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ReportStore for PgStore {
    async fn persist_result(&self, job_id: &str, report: &str) -> Result<(), StoreError> {
        ReportRepo::upsert(&self.pool, job_id, report).await?;
        tracing::debug!(job_id, len = report.len(), "Analysis report persisted");
        Ok(())
    }

    async fn load_persisted_result(&self, job_id: &str) -> Result<Option<String>, StoreError> {
        let row = ReportRepo::find_by_job_id(&self.pool, job_id).await?;
        Ok(row.map(|r| r.report))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn record_submission(&self, input: &NewSubmission) -> Result<Submission, StoreError> {
        Ok(SubmissionRepo::create(&self.pool, input).await?)
    }

    async fn recent_submissions(
        &self,
        resource_id: &str,
        limit: i64,
    ) -> Result<Vec<Submission>, StoreError> {
        Ok(SubmissionRepo::list_recent(&self.pool, resource_id, limit).await?)
    }

    async fn count_submissions(&self, resource_id: &str) -> Result<i64, StoreError> {
        Ok(SubmissionRepo::count_by_resource(&self.pool, resource_id).await?)
    }

    async fn append_rate_limit_notice(
        &self,
        resource_id: &str,
        client_key: &str,
        notice: &str,
    ) -> Result<(), StoreError> {
        RateLimitLogRepo::append(&self.pool, resource_id, client_key, notice).await?;
        Ok(())
    }
}
