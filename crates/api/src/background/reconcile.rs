//! Periodic retry of failed report writes.
//!
//! A completed analysis whose durable write failed stays completed in
//! memory. This loop retries those writes so the report survives a restart.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::engine::runner::JobRunner;

/// Run the reconciliation loop until `cancel` is triggered.
pub async fn run(runner: Arc<JobRunner>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Report reconciliation started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Report reconciliation stopping");
                break;
            }
            _ = ticker.tick() => {
                let written = runner.reconcile().await;
                if written > 0 {
                    tracing::info!(written, "Report reconciliation: recovered reports");
                } else {
                    tracing::debug!("Report reconciliation: nothing pending");
                }
            }
        }
    }
}
