//! Wire types for the platform's job API.

use crate::job::JobConfig;
use serde::{Deserialize, Serialize};

/// Request body for `get_presigned_url`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PresignedUrlRequest {
    /// Object key in cloud storage, the uploaded archive's filename.
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PresignedUrlResponse {
    pub presigned_url: String,
}

/// Request body for `queue_job`: the job configuration (with its `mode` tag
/// inline) plus the storage key of the uploaded archive.
#[derive(Debug, Serialize, Clone)]
pub struct QueueJobRequest {
    pub key: String,
    #[serde(flatten)]
    pub config: JobConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QueueJobResponse {
    /// Server-assigned job identifier.
    pub message_id: String,
}

/// Request body for `poll_job`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PollJobRequest {
    pub job_id: String,
}

/// Acknowledgement body for endpoints that return no payload of interest.
#[derive(Debug, Deserialize, Clone)]
pub struct AckResponse {
    #[serde(default)]
    #[allow(dead_code)]
    pub message: String,
}
