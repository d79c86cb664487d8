//! SimAtomic Platform Client
//!
//! A client for the SimAtomic platform, allowing job submission and status
//! polling. Every operation is a single request/response exchange; there is
//! no retry, caching, or backoff in here.

use crate::api::JobService;
use crate::api::error::ClientError;
use crate::api::types::{
    AckResponse, PollJobRequest, PresignedUrlRequest, PresignedUrlResponse, QueueJobRequest,
    QueueJobResponse,
};
use crate::environment::Environment;
use crate::job::{JobConfig, JobStatusResponse};
use log::{debug, info};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;

const API_KEY_HEADER: &str = "X-API-Key";

/// Applies to every request, including the archive upload. An implementation
/// choice, not part of the service contract.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

const ENDPOINT_PRESIGNED_URL: &str = "get_presigned_url";
const ENDPOINT_QUEUE_JOB: &str = "queue_job";
const ENDPOINT_START_SERVER: &str = "start_remote_server";
const ENDPOINT_POLL_JOB: &str = "poll_job";

#[derive(Debug, Clone)]
pub struct SimAtomicClient {
    client: Client,
    environment: Environment,
    api_key: String,
}

impl SimAtomicClient {
    /// Create a new client for the production platform with the given API
    /// key. No network I/O happens until the first operation.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_environment(api_key, Environment::default())
    }

    /// Create a client from a persisted configuration, e.g. one loaded from
    /// [`crate::config::get_config_path`].
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::with_environment(config.api_key.clone(), config.environment())
    }

    /// Create a new client against a specific environment.
    pub fn with_environment(api_key: impl Into<String>, environment: Environment) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            environment,
            api_key: api_key.into(),
        }
    }

    /// Get a reference to the environment.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.api_base_url().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    async fn handle_response_status(response: Response) -> Result<Response, ClientError> {
        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }
        Ok(response)
    }

    async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }

    /// POST a JSON body to a platform endpoint with the API key attached.
    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.build_url(endpoint);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await?;
        let response = Self::handle_response_status(response).await?;
        Self::decode_response(response).await
    }

    /// Check the input archive before touching the network. Returns its
    /// filename, which doubles as the cloud storage key.
    async fn validate_file(path: &Path) -> Result<String, ClientError> {
        let input_error = |source| ClientError::InputFile {
            path: path.to_path_buf(),
            source,
        };

        let metadata = tokio::fs::metadata(path).await.map_err(input_error)?;
        if !metadata.is_file() {
            return Err(input_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        path.file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                input_error(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path has no valid file name",
                ))
            })
    }

    async fn request_presigned_url(&self, key: &str) -> Result<String, ClientError> {
        let request = PresignedUrlRequest {
            key: key.to_string(),
        };
        let response: PresignedUrlResponse =
            self.post_json(ENDPOINT_PRESIGNED_URL, &request).await?;
        if response.presigned_url.is_empty() {
            return Err(ClientError::MalformedResponse(
                "empty presigned URL".to_string(),
            ));
        }
        Ok(response.presigned_url)
    }

    /// Upload the archive to cloud storage. The presigned URL already embeds
    /// the authorization, so no API key header is sent here.
    async fn upload_file(&self, presigned_url: &str, path: &Path) -> Result<(), ClientError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::InputFile {
                path: path.to_path_buf(),
                source,
            })?;
        let response = self.client.put(presigned_url).body(bytes).send().await?;
        Self::handle_response_status(response).await?;
        Ok(())
    }

    async fn queue_job(&self, key: &str, config: &JobConfig) -> Result<String, ClientError> {
        let request = QueueJobRequest {
            key: key.to_string(),
            config: config.clone(),
        };
        let response: QueueJobResponse = self.post_json(ENDPOINT_QUEUE_JOB, &request).await?;
        Ok(response.message_id)
    }

    async fn start_remote_server(&self) -> Result<(), ClientError> {
        let _: AckResponse = self
            .post_json(ENDPOINT_START_SERVER, &serde_json::json!({}))
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl JobService for SimAtomicClient {
    async fn submit(&self, file_path: &Path, config: &JobConfig) -> Result<String, ClientError> {
        // Local checks first, so a bad path or config never costs a request.
        let key = Self::validate_file(file_path).await?;
        config.validate()?;
        info!("[1/4] File validated: {}", key);

        let presigned_url = self.request_presigned_url(&key).await?;
        info!("[2/4] Upload URL ready");

        self.upload_file(&presigned_url, file_path).await?;
        info!("[3/4] Uploaded {} to cloud storage", key);

        let job_id = self.queue_job(&key, config).await?;
        self.start_remote_server().await?;
        info!(
            "[4/4] Job submitted | mode: {} | job_id: {}",
            config.mode(),
            job_id
        );
        debug!(
            "Submitted config: {}",
            serde_json::to_string(config).unwrap_or_default()
        );
        Ok(job_id)
    }

    async fn poll(&self, job_id: &str) -> Result<JobStatusResponse, ClientError> {
        let request = PollJobRequest {
            job_id: job_id.to_string(),
        };
        let url = self.build_url(ENDPOINT_POLL_JOB);
        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::JobNotFound {
                job_id: job_id.to_string(),
            });
        }
        let response = Self::handle_response_status(response).await?;
        Self::decode_response(response).await
    }
}
