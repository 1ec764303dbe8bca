use serde::Serialize;
use sqlx::FromRow;
use quickform_core::types::{DbId, Timestamp};

/// A row from the `rate_limit_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RateLimitEntry {
    pub id: DbId,
    pub resource_id: String,
    pub client_key: String,
    pub notice: String,
    pub logged_at: Timestamp,
}
