//! Analysis execution engine.
//!
//! [`runner::JobRunner`] accepts analysis jobs and runs each one on a
//! detached task, reporting through the shared
//! [`progress_store::JobProgressStore`]. Every provider call goes through
//! [`timeout::run_with_timeout`]. [`status::query_status`] answers polls.

pub mod progress_store;
pub mod runner;
pub mod status;
pub mod timeout;
