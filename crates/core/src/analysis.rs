//! Analysis job description and failure taxonomy.

use serde::Deserialize;

use crate::types::JobId;

/// Report text stored when the model returns nothing usable.
pub const EMPTY_REPORT_PLACEHOLDER: &str = "The analysis produced no content. \
This usually means there were too few submissions, the data was malformed, \
or the model failed to process it. Submit more data or adjust the prompt and \
run the analysis again.";

/// Prefixes that providers use when they smuggle an error into a normal reply.
const EMBEDDED_ERROR_PREFIXES: [&str; 3] = ["Error:", "ERROR:", "错误："];

/// One request to run the model over a prompt and keep the outcome.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisJob {
    /// Stable identifier chosen by the caller (usually the task id).
    pub job_id: JobId,
    /// Fully rendered prompt sent to the model.
    pub prompt: String,
    /// Provider name; the configured default is used when absent.
    pub provider: Option<String>,
    /// Replace a job with the same id that is still running.
    #[serde(default)]
    pub supersede: bool,
}

/// Why an analysis did not produce a stored report.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Missing provider selection or credentials. Never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider did not answer within its deadline.
    #[error("Calling {provider} timed out after {deadline_secs}s")]
    TimedOut {
        provider: String,
        deadline_secs: u64,
    },

    /// The provider answered with an application-level failure.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The durable write after a successful analysis failed.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl AnalysisError {
    /// Text shown to the polling client for a failed job.
    pub fn user_message(&self) -> String {
        match self {
            Self::TimedOut { .. } => format!(
                "Analysis timed out: {self}. Check the provider connection or try again later"
            ),
            Self::Provider(msg) => format!("API call failed: {msg}"),
            other => other.to_string(),
        }
    }
}

/// Return the error text if `reply` is an error disguised as a successful
/// model response.
pub fn embedded_error(reply: &str) -> Option<&str> {
    let trimmed = reply.trim_start();
    EMBEDDED_ERROR_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
        .then_some(trimmed)
}

/// Replace a blank model reply with [`EMPTY_REPORT_PLACEHOLDER`].
pub fn normalize_report(reply: String) -> String {
    if reply.trim().is_empty() {
        EMPTY_REPORT_PLACEHOLDER.to_string()
    } else {
        reply
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
