//! Sliding-window admission policy for high-volume submission endpoints.
//!
//! Pure logic, no locking. The caller keeps one [`ClientWindow`] per client
//! key (e.g. in a `Mutex<HashMap<..>>`) and passes the current time in.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::types::Timestamp;

/// Default maximum accepted submissions per window.
pub const DEFAULT_THRESHOLD: usize = 50;

/// Default sliding window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// Default blacklist duration after a burst.
pub const DEFAULT_BLACKLIST: Duration = Duration::from_secs(300);

/// Burst threshold and timing used by [`ClientWindow::admit`].
#[derive(Debug, Clone, Copy)]
pub struct AdmissionPolicy {
    threshold: usize,
    window: Duration,
    blacklist: Duration,
}

impl AdmissionPolicy {
    pub fn new(threshold: usize, window: Duration, blacklist: Duration) -> Self {
        Self {
            threshold,
            window,
            blacklist,
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn blacklist(&self) -> Duration {
        self.blacklist
    }

    fn window_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.window).unwrap_or(TimeDelta::MAX)
    }

    fn blacklist_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.blacklist).unwrap_or(TimeDelta::MAX)
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD, DEFAULT_WINDOW, DEFAULT_BLACKLIST)
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admit,
    Reject(Rejection),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admit)
    }
}

/// Why a submission was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The client is still serving an earlier blacklist.
    Blacklisted { until: Timestamp },
    /// This submission pushed the client over the threshold.
    BurstDetected { events: usize, until: Timestamp },
}

impl Rejection {
    pub fn blacklisted_until(&self) -> Timestamp {
        match self {
            Self::Blacklisted { until } | Self::BurstDetected { until, .. } => *until,
        }
    }
}

/// One client's recent admission history.
#[derive(Debug, Default, Clone)]
pub struct ClientWindow {
    recent_events: VecDeque<Timestamp>,
    blacklisted_until: Option<Timestamp>,
}

impl ClientWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a submission at `now` is admitted, recording it if so.
    ///
    /// Rejections during a blacklist are not recorded, so a client hammering
    /// the endpoint while blocked does not extend its own punishment.
    pub fn admit(&mut self, policy: &AdmissionPolicy, now: Timestamp) -> Admission {
        if let Some(until) = self.blacklisted_until {
            if now < until {
                return Admission::Reject(Rejection::Blacklisted { until });
            }
        }

        self.purge(policy, now);
        self.recent_events.push_back(now);

        if self.recent_events.len() > policy.threshold {
            let until = now
                .checked_add_signed(policy.blacklist_delta())
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            self.blacklisted_until = Some(until);
            return Admission::Reject(Rejection::BurstDetected {
                events: self.recent_events.len(),
                until,
            });
        }

        Admission::Admit
    }

    /// Drop events older than `now - window`.
    fn purge(&mut self, policy: &AdmissionPolicy, now: Timestamp) {
        let window = policy.window_delta();
        while let Some(oldest) = self.recent_events.front() {
            if now.signed_duration_since(*oldest) > window {
                self.recent_events.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn recent_count(&self) -> usize {
        self.recent_events.len()
    }

    pub fn blacklisted_until(&self) -> Option<Timestamp> {
        self.blacklisted_until
    }

    pub fn is_blacklisted(&self, now: Timestamp) -> bool {
        self.blacklisted_until.is_some_and(|until| now < until)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
