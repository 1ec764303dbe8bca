//! Route definitions for the `/submit` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::submit;
use crate::state::AppState;

/// Routes mounted at `/api/v1/submit`, under the public CORS layer.
///
/// ```text
/// POST   /{resource_id}       -> submit_form (rate limited)
/// GET    /{resource_id}       -> recent_submissions
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/{resource_id}",
        post(submit::submit_form).get(submit::recent_submissions),
    )
}
