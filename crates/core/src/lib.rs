//! Domain types and pure logic for the QuickForm analysis engine.
//!
//! Nothing in this crate performs I/O: job records, provider selection,
//! the analysis error taxonomy and the sliding-window admission policy are
//! all plain data plus functions, so the API crate can wrap them in locks
//! and tasks without duplicating any rules.

pub mod admission;
pub mod analysis;
pub mod error;
pub mod job_status;
pub mod provider;
pub mod types;
