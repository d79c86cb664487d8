//! Error handling for the SimAtomic client.

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// JSON error body the platform returns on failed requests.
#[derive(Deserialize)]
struct RawError {
    #[serde(alias = "error")]
    message: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The local input archive is missing or unreadable. Raised before any
    /// network call is made.
    #[error("Input file error for '{path}': {source}", path = path.display())]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The platform rejected the API key.
    #[error("Authentication rejected: {message}")]
    Auth { message: String },

    /// The platform (or local validation) rejected the job configuration.
    #[error("Invalid job configuration: {message}")]
    InvalidConfig { message: String },

    /// The job ID is unknown to the platform.
    #[error("Job not found: {job_id}")]
    JobNotFound { job_id: String },

    /// Any other non-success HTTP response.
    #[error("HTTP error with status {status}: {message}")]
    Http { status: u16, message: String },

    /// Network-level failure, typically a connection or timeout problem.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a body the client could not interpret.
    #[error("Malformed server response: {0}")]
    MalformedResponse(String),
}

impl ClientError {
    /// Map a non-success HTTP response onto the error taxonomy, pulling the
    /// server-supplied message out of the JSON body when there is one.
    pub async fn from_response(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read response text".to_string());
        let message = serde_json::from_str::<RawError>(&body)
            .map(|raw| raw.message)
            .unwrap_or(body);

        match status {
            401 | 403 => ClientError::Auth { message },
            400 | 422 => ClientError::InvalidConfig { message },
            _ => ClientError::Http { status, message },
        }
    }
}

impl From<crate::job::InvalidJobConfig> for ClientError {
    fn from(err: crate::job::InvalidJobConfig) -> Self {
        ClientError::InvalidConfig { message: err.0 }
    }
}
