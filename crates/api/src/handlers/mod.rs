pub mod jobs;
pub mod submit;
