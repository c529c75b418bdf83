//! State module for tracking crawl progress
//!
//! `JobStatus` tracks where each frontier URL is in its TODO → IN_PROGRESS → DONE
//! lifecycle.

mod job_status;

pub use job_status::JobStatus;
