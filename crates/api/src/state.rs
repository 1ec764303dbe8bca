use std::sync::Arc;

use quickform_db::SubmissionStore;

use crate::admission::AdmissionController;
use crate::config::ServerConfig;
use crate::engine::runner::JobRunner;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Analysis engine; owns the job progress store and the report store.
    pub runner: Arc<JobRunner>,
    /// Submission rate limiter.
    pub admission: Arc<AdmissionController>,
    /// Durable form submissions and their rate-limit log.
    pub submissions: Arc<dyn SubmissionStore>,
}
