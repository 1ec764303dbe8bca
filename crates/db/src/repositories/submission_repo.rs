//! Repository for the `form_submissions` table.

use sqlx::PgPool;

use crate::models::submission::{NewSubmission, Submission};

/// Column list for `form_submissions` queries.
const COLUMNS: &str = "id, resource_id, data, client_key, submitted_at";

/// Maximum page size for recent submissions.
const MAX_LIMIT: i64 = 100;

/// Provides CRUD operations for form submissions.
pub struct SubmissionRepo;

impl SubmissionRepo {
    /// Insert a submission and return the stored row.
    pub async fn create(pool: &PgPool, input: &NewSubmission) -> Result<Submission, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_submissions (resource_id, data, client_key) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(&input.resource_id)
            .bind(&input.data)
            .bind(&input.client_key)
            .fetch_one(pool)
            .await
    }

    /// Newest submissions for a resource, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        resource_id: &str,
        limit: i64,
    ) -> Result<Vec<Submission>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_submissions \
             WHERE resource_id = $1 \
             ORDER BY submitted_at DESC, id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, Submission>(&query)
            .bind(resource_id)
            .bind(limit.clamp(1, MAX_LIMIT))
            .fetch_all(pool)
            .await
    }

    /// Total submissions for a resource.
    pub async fn count_by_resource(pool: &PgPool, resource_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM form_submissions WHERE resource_id = $1",
        )
        .bind(resource_id)
        .fetch_one(pool)
        .await
    }
}
