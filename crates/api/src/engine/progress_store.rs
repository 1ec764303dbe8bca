//! Process-wide table of job progress, guarded by a single lock.
//!
//! Every operation takes the lock, touches the map and releases it; no I/O
//! ever happens while it is held. Records are replaced whole, never merged,
//! so a progress tick can never interleave with a terminal write.
//!
//! Entries live for the lifetime of the process and are lost on restart;
//! the status API falls back to durable storage for completed jobs.

use std::collections::HashMap;

use quickform_core::error::CoreError;
use quickform_core::job_status::{JobRecord, JobState};
use quickform_core::types::JobId;
use tokio::sync::Mutex;

/// Ownership token for one run of a job.
///
/// Writes through [`JobProgressStore::update`] only land while the attempt
/// is the newest one for its job, so a superseded or abandoned run cannot
/// overwrite its successor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    job_id: JobId,
    generation: u64,
}

impl Attempt {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct Entry {
    generation: u64,
    record: JobRecord,
    /// Completed result not yet confirmed in durable storage.
    needs_persist: bool,
}

#[derive(Default)]
struct Table {
    entries: HashMap<JobId, Entry>,
    next_generation: u64,
}

/// Shared job state keyed by job id.
#[derive(Default)]
pub struct JobProgressStore {
    table: Mutex<Table>,
}

impl JobProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record for `job_id` unconditionally.
    pub async fn set_status(&self, job_id: &str, record: JobRecord) {
        let mut table = self.table.lock().await;
        match table.entries.get_mut(job_id) {
            Some(entry) => {
                entry.record = record;
                entry.needs_persist = false;
            }
            None => {
                table.entries.insert(
                    job_id.to_string(),
                    Entry {
                        generation: 0,
                        record,
                        needs_persist: false,
                    },
                );
            }
        }
    }

    /// Current record for `job_id`, if the job has been seen.
    pub async fn get_status(&self, job_id: &str) -> Option<JobRecord> {
        self.table
            .lock()
            .await
            .entries
            .get(job_id)
            .map(|entry| entry.record.clone())
    }

    /// Start a new attempt for `initial.job_id` and write `initial`.
    ///
    /// Fails with [`CoreError::Conflict`] if the job is already in progress
    /// and `supersede` is false. With `supersede`, the running attempt loses
    /// ownership and its later writes are ignored.
    pub async fn begin(&self, initial: JobRecord, supersede: bool) -> Result<Attempt, CoreError> {
        let mut table = self.table.lock().await;

        if let Some(existing) = table.entries.get(&initial.job_id) {
            if existing.record.is_in_progress() && !supersede {
                return Err(CoreError::Conflict(format!(
                    "Analysis for job {} is already in progress",
                    initial.job_id
                )));
            }
        }

        table.next_generation += 1;
        let generation = table.next_generation;
        let attempt = Attempt {
            job_id: initial.job_id.clone(),
            generation,
        };
        table.entries.insert(
            initial.job_id.clone(),
            Entry {
                generation,
                record: initial,
                needs_persist: false,
            },
        );
        Ok(attempt)
    }

    /// Replace the record on behalf of `attempt`.
    ///
    /// Returns `false` (and writes nothing) if a newer attempt owns the job.
    /// While both old and new records are in progress, the percentage never
    /// moves backwards.
    pub async fn update(&self, attempt: &Attempt, mut record: JobRecord) -> bool {
        let mut table = self.table.lock().await;
        let Some(entry) = table.entries.get_mut(&attempt.job_id) else {
            return false;
        };
        if entry.generation != attempt.generation {
            return false;
        }

        if record.is_in_progress() && entry.record.is_in_progress() {
            record.progress_percent = record.progress_percent.max(entry.record.progress_percent);
        }
        entry.needs_persist = record.status == JobState::Completed;
        entry.record = record;
        true
    }

    /// Record that `attempt`'s completed result reached durable storage.
    pub async fn mark_persisted(&self, attempt: &Attempt) -> bool {
        let mut table = self.table.lock().await;
        match table.entries.get_mut(&attempt.job_id) {
            Some(entry) if entry.generation == attempt.generation => {
                entry.needs_persist = false;
                true
            }
            _ => false,
        }
    }

    /// Completed jobs whose durable write has not succeeded yet.
    pub async fn pending_persistence(&self) -> Vec<(Attempt, String)> {
        let table = self.table.lock().await;
        table
            .entries
            .iter()
            .filter(|(_, entry)| entry.needs_persist)
            .filter_map(|(job_id, entry)| {
                entry.record.result().map(|result| {
                    (
                        Attempt {
                            job_id: job_id.clone(),
                            generation: entry.generation,
                        },
                        result.to_string(),
                    )
                })
            })
            .collect()
    }

    /// Number of jobs tracked since startup.
    pub async fn len(&self) -> usize {
        self.table.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
