//! Fire-and-forget execution of analysis jobs.
//!
//! A job moves `NotStarted -> InProgress -> {Completed | Failed}`. The
//! request path only validates and claims the job; the provider call runs
//! on a detached task under the provider's deadline and always ends in a
//! terminal record.

use std::sync::Arc;

use quickform_core::analysis::{embedded_error, normalize_report, AnalysisError, AnalysisJob};
use quickform_core::error::CoreError;
use quickform_core::job_status::{
    JobRecord, MSG_PREPARING, MSG_WORKING, PROGRESS_ACCEPTED, PROGRESS_WORKING,
};
use quickform_core::provider::{DeadlinePolicy, ProviderConfig, ProviderCredentials};
use quickform_core::types::JobId;
use quickform_db::ReportStore;
use quickform_providers::{ModelClient, ProviderError};

use crate::engine::progress_store::{Attempt, JobProgressStore};
use crate::engine::timeout::{run_with_timeout, TimeoutError};

/// Runs analysis jobs against the configured model providers.
pub struct JobRunner {
    progress: Arc<JobProgressStore>,
    reports: Arc<dyn ReportStore>,
    client: Arc<dyn ModelClient>,
    credentials: ProviderCredentials,
    default_provider: Option<String>,
    deadlines: DeadlinePolicy,
}

impl JobRunner {
    pub fn new(
        reports: Arc<dyn ReportStore>,
        client: Arc<dyn ModelClient>,
        credentials: ProviderCredentials,
    ) -> Self {
        Self {
            progress: Arc::new(JobProgressStore::new()),
            reports,
            client,
            credentials,
            default_provider: None,
            deadlines: DeadlinePolicy::default(),
        }
    }

    /// Provider used for jobs that do not name one.
    pub fn with_default_provider(mut self, provider: Option<String>) -> Self {
        self.default_provider = provider;
        self
    }

    pub fn with_deadlines(mut self, deadlines: DeadlinePolicy) -> Self {
        self.deadlines = deadlines;
        self
    }

    pub fn progress(&self) -> &Arc<JobProgressStore> {
        &self.progress
    }

    pub fn reports(&self) -> &Arc<dyn ReportStore> {
        &self.reports
    }

    /// Accept `job` and return its id without waiting for the model.
    ///
    /// A job that fails its preconditions (empty prompt, no provider, no
    /// credentials) is recorded as failed and never reaches the provider.
    /// Returns [`CoreError::Conflict`] when the job is already running and
    /// `supersede` is not set.
    pub async fn enqueue(self: &Arc<Self>, job: AnalysisJob) -> Result<JobId, CoreError> {
        let job_id = job.job_id.trim().to_string();
        if job_id.is_empty() {
            return Err(CoreError::Validation("job_id must not be empty".to_string()));
        }

        let prepared = self.prepare(&job);
        let initial = match &prepared {
            Ok(_) => JobRecord::in_progress(&job_id, PROGRESS_ACCEPTED, MSG_PREPARING),
            Err(e) => JobRecord::failed(&job_id, e.user_message()),
        };
        let attempt = self.progress.begin(initial, job.supersede).await?;

        let config = match prepared {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "Analysis rejected before provider call");
                return Ok(job_id);
            }
        };

        tracing::info!(
            job_id = %job_id,
            provider = %config.kind,
            generation = attempt.generation(),
            superseding = job.supersede,
            "Analysis enqueued",
        );

        let runner = Arc::clone(self);
        tokio::spawn(async move {
            runner.run(attempt, job.prompt, config).await;
        });

        Ok(job_id)
    }

    /// Check the job can be run and resolve its provider.
    fn prepare(&self, job: &AnalysisJob) -> Result<ProviderConfig, AnalysisError> {
        if job.prompt.trim().is_empty() {
            return Err(AnalysisError::Configuration(
                "Prompt must not be empty".to_string(),
            ));
        }
        let selected = job
            .provider
            .as_deref()
            .or(self.default_provider.as_deref());
        self.credentials.resolve(selected)
    }

    async fn run(&self, attempt: Attempt, prompt: String, config: ProviderConfig) {
        let job_id = attempt.job_id().to_string();
        self.progress
            .update(
                &attempt,
                JobRecord::in_progress(&job_id, PROGRESS_WORKING, MSG_WORKING),
            )
            .await;

        match self.analyse(prompt, config).await {
            Ok(report) => self.complete(&attempt, report).await,
            Err(err) => {
                tracing::error!(job_id = %job_id, error = %err, "Analysis failed");
                let applied = self
                    .progress
                    .update(&attempt, JobRecord::failed(&job_id, err.user_message()))
                    .await;
                if !applied {
                    tracing::info!(job_id = %job_id, "Attempt superseded, failure dropped");
                }
            }
        }
    }

    /// Call the provider under its deadline and turn the reply into a report.
    async fn analyse(&self, prompt: String, config: ProviderConfig) -> Result<String, AnalysisError> {
        let kind = config.kind;
        let deadline = self.deadlines.deadline_for(kind);
        let client = Arc::clone(&self.client);

        let outcome = run_with_timeout(deadline, move |token| async move {
            tokio::select! {
                _ = token.cancelled() => Err(ProviderError::Cancelled),
                reply = client.generate(&prompt, &config) => reply,
            }
        })
        .await;

        let reply = match outcome {
            Ok(reply) => reply,
            Err(TimeoutError::TimedOut { deadline }) => {
                return Err(AnalysisError::TimedOut {
                    provider: kind.to_string(),
                    deadline_secs: deadline.as_secs(),
                })
            }
            Err(TimeoutError::Failed(e)) => return Err(AnalysisError::Provider(e.to_string())),
            Err(TimeoutError::Panicked(msg)) => {
                return Err(AnalysisError::Provider(format!(
                    "provider call panicked: {msg}"
                )))
            }
        };

        if let Some(message) = embedded_error(&reply) {
            return Err(AnalysisError::Provider(message.to_string()));
        }
        Ok(normalize_report(reply))
    }

    /// Publish the report in memory, then write it through to storage.
    async fn complete(&self, attempt: &Attempt, report: String) {
        let job_id = attempt.job_id();
        let applied = self
            .progress
            .update(attempt, JobRecord::completed(job_id, report.clone()))
            .await;
        if !applied {
            tracing::info!(job_id, "Attempt superseded, result dropped");
            return;
        }

        tracing::info!(
            job_id,
            report_chars = report.chars().count(),
            "Analysis completed",
        );
        self.persist(attempt, &report).await;
    }

    /// Write a completed report to durable storage.
    ///
    /// Failure leaves the in-memory record completed and flagged for
    /// [`JobRunner::reconcile`].
    async fn persist(&self, attempt: &Attempt, report: &str) -> bool {
        match self.reports.persist_result(attempt.job_id(), report).await {
            Ok(()) => {
                self.progress.mark_persisted(attempt).await;
                true
            }
            Err(e) => {
                let err = AnalysisError::Persistence(e.to_string());
                tracing::error!(job_id = attempt.job_id(), error = %err, "Failed to persist analysis report");
                false
            }
        }
    }

    /// Retry persistence for every completed job whose write failed.
    ///
    /// Returns the number of reports written.
    pub async fn reconcile(&self) -> usize {
        let mut written = 0;
        for (attempt, report) in self.progress.pending_persistence().await {
            if self.persist(&attempt, &report).await {
                tracing::info!(job_id = attempt.job_id(), "Recovered unpersisted report");
                written += 1;
            }
        }
        written
    }
}
