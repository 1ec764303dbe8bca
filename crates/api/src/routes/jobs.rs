//! Route definitions for the `/jobs` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Routes mounted at `/jobs`.
///
/// ```text
/// POST   /{job_id}            -> enqueue_analysis
/// GET    /{job_id}/status     -> job_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{job_id}", post(jobs::enqueue_analysis))
        .route("/{job_id}/status", get(jobs::job_status))
}
