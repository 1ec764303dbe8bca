//! Row structs and insert DTOs.

pub mod rate_limit;
pub mod report;
pub mod submission;
