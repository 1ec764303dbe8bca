//! Deadline enforcement for slow external calls.
//!
//! [`run_with_timeout`] runs an operation on its own tokio task and waits at
//! most `deadline` for it. On expiry the operation's [`CancellationToken`]
//! is cancelled and the task is detached, not aborted: an operation that
//! ignores the token may still finish later, and its output is discarded.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Failure of a guarded operation.
#[derive(Debug, thiserror::Error)]
pub enum TimeoutError<E> {
    /// The deadline elapsed before the operation finished.
    #[error("timed out after {}s", .deadline.as_secs())]
    TimedOut { deadline: Duration },

    /// The operation finished with its own error.
    #[error("{0}")]
    Failed(E),

    /// The operation's task panicked.
    #[error("operation panicked: {0}")]
    Panicked(String),
}

/// Run `operation` on a separate task under `deadline`.
///
/// The operation receives a token that is cancelled when the deadline
/// passes; cooperating operations should select on it to abort in-flight
/// work (e.g. drop a pending HTTP request).
pub async fn run_with_timeout<T, E, F, Fut>(
    deadline: Duration,
    operation: F,
) -> Result<T, TimeoutError<E>>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let token = CancellationToken::new();
    let handle = tokio::spawn(operation(token.clone()));

    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(outcome)) => outcome.map_err(TimeoutError::Failed),
        Ok(Err(join_err)) => Err(TimeoutError::Panicked(join_err.to_string())),
        Err(_elapsed) => {
            token.cancel();
            Err(TimeoutError::TimedOut { deadline })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
