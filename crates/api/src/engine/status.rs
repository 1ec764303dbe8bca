//! Read side of the job lifecycle.

use quickform_core::job_status::JobStatusView;
use quickform_db::{ReportStore, StoreError};

use crate::engine::progress_store::JobProgressStore;

/// Resolve the status shown to a polling client.
///
/// The in-memory record wins. Without one, a report in durable storage
/// means the job completed in an earlier process; otherwise the job has
/// not started.
pub async fn query_status(
    progress: &JobProgressStore,
    reports: &dyn ReportStore,
    job_id: &str,
) -> Result<JobStatusView, StoreError> {
    if let Some(record) = progress.get_status(job_id).await {
        return Ok(record.to_view());
    }

    match reports.load_persisted_result(job_id).await? {
        Some(result) => Ok(JobStatusView::Completed { result }),
        None => Ok(JobStatusView::NotStarted),
    }
}
