//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod rate_limit_log_repo;
pub mod report_repo;
pub mod submission_repo;

pub use rate_limit_log_repo::RateLimitLogRepo;
pub use report_repo::ReportRepo;
pub use submission_repo::SubmissionRepo;
