//! Shared response envelope types for API handlers.
//!
//! Most API responses use a `{ "data": ... }` envelope. The job status and
//! submission endpoints are polled by embedded form scripts and keep their
//! flat bodies instead.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
