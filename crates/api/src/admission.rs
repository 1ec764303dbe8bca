//! Per-client admission control for the submission endpoint.
//!
//! Wraps one [`ClientWindow`] per client key behind a single lock. The
//! decision logic lives in [`quickform_core::admission`]; this type only
//! owns the shared map.

use std::collections::HashMap;

use quickform_core::admission::{Admission, AdmissionPolicy, ClientWindow, Rejection};
use quickform_core::types::Timestamp;
use tokio::sync::Mutex;

/// Sliding-window rate limiter with a temporary blacklist.
pub struct AdmissionController {
    policy: AdmissionPolicy,
    clients: Mutex<HashMap<String, ClientWindow>>,
}

impl AdmissionController {
    pub fn new(policy: AdmissionPolicy) -> Self {
        Self {
            policy,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Decide whether `client_key` may submit at `now`.
    pub async fn admit(&self, client_key: &str, now: Timestamp) -> Admission {
        let decision = {
            let mut clients = self.clients.lock().await;
            clients
                .entry(client_key.to_string())
                .or_default()
                .admit(&self.policy, now)
        };

        match &decision {
            Admission::Admit => {}
            Admission::Reject(Rejection::BurstDetected { events, until }) => {
                tracing::warn!(
                    client_key,
                    events,
                    threshold = self.policy.threshold(),
                    blacklisted_until = %until,
                    "Submission burst detected, client blacklisted",
                );
            }
            Admission::Reject(Rejection::Blacklisted { until }) => {
                tracing::warn!(
                    client_key,
                    blacklisted_until = %until,
                    "Submission rejected, client blacklisted",
                );
            }
        }

        decision
    }

    /// Number of clients with admission history.
    pub async fn tracked_clients(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Human-readable audit line for a rejection.
    pub fn rejection_notice(&self, client_key: &str, now: Timestamp) -> String {
        format!(
            "[{}] client {} exceeded {} submissions within {}s; blocked for {} min",
            now.format("%Y-%m-%d %H:%M:%S UTC"),
            client_key,
            self.policy.threshold(),
            self.policy.window().as_secs(),
            self.policy.blacklist().as_secs() / 60,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
