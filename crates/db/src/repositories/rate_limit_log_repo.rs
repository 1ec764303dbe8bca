//! Repository for the `rate_limit_log` table.

use sqlx::PgPool;

use crate::models::rate_limit::RateLimitEntry;

/// Column list for `rate_limit_log` queries.
const COLUMNS: &str = "id, resource_id, client_key, notice, logged_at";

/// Append-only audit log of throttled clients per resource.
pub struct RateLimitLogRepo;

impl RateLimitLogRepo {
    /// Append one notice to a resource's log.
    pub async fn append(
        pool: &PgPool,
        resource_id: &str,
        client_key: &str,
        notice: &str,
    ) -> Result<RateLimitEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO rate_limit_log (resource_id, client_key, notice) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RateLimitEntry>(&query)
            .bind(resource_id)
            .bind(client_key)
            .bind(notice)
            .fetch_one(pool)
            .await
    }

    /// All notices for a resource, oldest first.
    pub async fn list_by_resource(
        pool: &PgPool,
        resource_id: &str,
    ) -> Result<Vec<RateLimitEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rate_limit_log WHERE resource_id = $1 ORDER BY logged_at, id"
        );
        sqlx::query_as::<_, RateLimitEntry>(&query)
            .bind(resource_id)
            .fetch_all(pool)
            .await
    }
}
