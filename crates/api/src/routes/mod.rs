pub mod health;
pub mod jobs;
pub mod submit;

use axum::Router;

use crate::state::AppState;

/// Build the operator-facing `/api/v1` route tree.
///
/// ```text
/// /jobs/{job_id}                                   enqueue analysis (POST)
/// /jobs/{job_id}/status                            poll analysis status (GET)
/// ```
///
/// `/api/v1/submit` is mounted separately by the router builder because it
/// carries its own CORS policy.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/jobs", jobs::router())
}
