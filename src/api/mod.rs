//! The SimAtomic service seam.
//!
//! `JobService` is the programmatic contract; `SimAtomicClient` is the HTTP
//! implementation against the platform.

mod client;
mod error;
mod types;

pub use client::SimAtomicClient;
pub use error::ClientError;

use crate::job::{JobConfig, JobStatusResponse};
use std::path::Path;

/// Submission and polling operations against the SimAtomic platform.
///
/// Implemented by [`SimAtomicClient`]; tests substitute their own
/// implementations to exercise callers without a network.
#[async_trait::async_trait]
pub trait JobService {
    /// Upload the archive at `file_path` and queue a job with the given
    /// configuration. Returns the server-assigned job ID.
    async fn submit(&self, file_path: &Path, config: &JobConfig) -> Result<String, ClientError>;

    /// Fetch the current status of a previously submitted job. A single
    /// point-in-time query; the caller owns any retry loop.
    async fn poll(&self, job_id: &str) -> Result<JobStatusResponse, ClientError>;
}
