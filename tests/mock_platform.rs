//! Integration tests against an in-process mock of the SimAtomic platform.
//!
//! The mock serves the four job endpoints plus a presigned upload target,
//! and walks each submitted job through queued -> running -> success.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use simatomic_client::api::{ClientError, JobService, SimAtomicClient};
use simatomic_client::environment::Environment;
use simatomic_client::job::{AnalysisParams, JobConfig, JobStatus, MmPbsaParams};
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const TEST_API_KEY: &str = "test-api-key";

struct MockPlatform {
    addr: SocketAddr,
    /// Poll count per known job, driving the queued -> running -> success walk.
    jobs: Mutex<HashMap<String, u32>>,
    /// Storage keys that have been PUT to the presigned URL.
    uploads: Mutex<HashSet<String>>,
    /// Total requests received, across all endpoints.
    hits: AtomicUsize,
}

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn error_body(message: &str) -> Json<Value> {
    Json(json!({ "error": message }))
}

fn check_auth(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    match headers.get("X-API-Key").and_then(|v| v.to_str().ok()) {
        Some(key) if key == TEST_API_KEY => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, error_body("invalid API key"))),
    }
}

async fn get_presigned_url(
    State(state): State<Arc<MockPlatform>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    state.hits.fetch_add(1, Ordering::SeqCst);
    check_auth(&headers)?;

    let key = body
        .get("key")
        .and_then(Value::as_str)
        .ok_or((StatusCode::BAD_REQUEST, error_body("missing key")))?;
    Ok(Json(json!({
        "presigned_url": format!("http://{}/upload/{}", state.addr, key)
    })))
}

async fn upload(
    State(state): State<Arc<MockPlatform>>,
    Path(key): Path<String>,
    body: axum::body::Bytes,
) -> StatusCode {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if body.is_empty() {
        return StatusCode::BAD_REQUEST;
    }
    state.uploads.lock().unwrap().insert(key);
    StatusCode::OK
}

async fn queue_job(
    State(state): State<Arc<MockPlatform>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    state.hits.fetch_add(1, Ordering::SeqCst);
    check_auth(&headers)?;

    let bad_request = |message: &str| (StatusCode::BAD_REQUEST, error_body(message));

    let key = body
        .get("key")
        .and_then(Value::as_str)
        .ok_or_else(|| bad_request("missing key"))?;
    if !state.uploads.lock().unwrap().contains(key) {
        return Err(bad_request("archive was not uploaded"));
    }

    match body.get("mode").and_then(Value::as_str) {
        Some("analysis") => {}
        Some("mmpbsa") => {
            let mask = body.get("ligand_chain_mask").and_then(Value::as_str);
            if mask.map_or(true, |m| m.trim().is_empty()) {
                return Err(bad_request("ligand_chain_mask is required"));
            }
            // Server-side-only validation: the GB model must be a known one.
            let igb = body.get("igb").and_then(Value::as_u64).unwrap_or(5);
            if ![1, 2, 5, 7, 8].contains(&igb) {
                return Err(bad_request("unsupported igb value"));
            }
        }
        _ => return Err(bad_request("mode must be one of: analysis, mmpbsa")),
    }

    let job_id = uuid::Uuid::new_v4().to_string();
    state.jobs.lock().unwrap().insert(job_id.clone(), 0);
    Ok(Json(json!({ "message_id": job_id })))
}

async fn start_remote_server(
    State(state): State<Arc<MockPlatform>>,
    headers: HeaderMap,
) -> Reply {
    state.hits.fetch_add(1, Ordering::SeqCst);
    check_auth(&headers)?;
    Ok(Json(json!({ "message": "server starting" })))
}

async fn poll_job(
    State(state): State<Arc<MockPlatform>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    state.hits.fetch_add(1, Ordering::SeqCst);
    check_auth(&headers)?;

    let job_id = body
        .get("job_id")
        .and_then(Value::as_str)
        .ok_or((StatusCode::BAD_REQUEST, error_body("missing job_id")))?;

    let mut jobs = state.jobs.lock().unwrap();
    let Some(count) = jobs.get_mut(job_id) else {
        return Err((StatusCode::NOT_FOUND, error_body("job not found")));
    };

    let (status, message) = match *count {
        0 => ("queued", String::new()),
        1 => ("running", String::new()),
        _ => (
            "success",
            format!("https://storage.simatomic.com/results/{}.zip", job_id),
        ),
    };
    // Advance towards success; terminal state is sticky.
    if *count < 2 {
        *count += 1;
    }

    Ok(Json(json!({
        "job_id": job_id,
        "job_status": status,
        "message": message,
    })))
}

/// Start the mock platform on an ephemeral port. Returns its state and the
/// API base URL to point a client at.
async fn spawn_mock_platform() -> (Arc<MockPlatform>, String) {
    let _ = env_logger::builder().is_test(true).try_init();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock platform");
    let addr = listener.local_addr().unwrap();

    let state = Arc::new(MockPlatform {
        addr,
        jobs: Mutex::new(HashMap::new()),
        uploads: Mutex::new(HashSet::new()),
        hits: AtomicUsize::new(0),
    });

    let app = Router::new()
        .route("/api/api_handler/get_presigned_url", post(get_presigned_url))
        .route("/api/api_handler/queue_job", post(queue_job))
        .route("/api/api_handler/start_remote_server", post(start_remote_server))
        .route("/api/api_handler/poll_job", post(poll_job))
        .route("/upload/:key", put(upload))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base_url = format!("http://{}/api/api_handler", addr);
    (state, base_url)
}

fn client_for(base_url: &str, api_key: &str) -> SimAtomicClient {
    SimAtomicClient::with_environment(
        api_key,
        Environment::Custom {
            base_url: base_url.to_string(),
        },
    )
}

/// Write a stand-in trajectory archive into a temp dir.
fn write_archive(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("traj.zip");
    std::fs::write(&path, b"PK\x03\x04 stand-in archive bytes").unwrap();
    path
}

#[tokio::test]
// Full happy path: submit an mmpbsa job, then observe queued -> running ->
// success with a download URL in the final message.
async fn test_end_to_end_mmpbsa_job() {
    let (_state, base_url) = spawn_mock_platform().await;
    let client = client_for(&base_url, TEST_API_KEY);

    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&dir);
    let config = JobConfig::Mmpbsa(MmPbsaParams::new(":10-20"));

    let job_id = client.submit(&archive, &config).await.unwrap();
    assert!(!job_id.is_empty());

    let first = client.poll(&job_id).await.unwrap();
    assert_eq!(first.job_status, JobStatus::Queued);
    assert_eq!(first.job_id, job_id);

    let second = client.poll(&job_id).await.unwrap();
    assert_eq!(second.job_status, JobStatus::Running);

    let third = client.poll(&job_id).await.unwrap();
    assert_eq!(third.job_status, JobStatus::Success);
    assert!(!third.message.is_empty());
    assert!(third.message.starts_with("https://"));
}

#[tokio::test]
// Analysis jobs go through the same pipeline.
async fn test_submit_analysis_job() {
    let (_state, base_url) = spawn_mock_platform().await;
    let client = client_for(&base_url, TEST_API_KEY);

    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&dir);
    let config = JobConfig::Analysis(AnalysisParams::default());

    let job_id = client.submit(&archive, &config).await.unwrap();
    let status = client.poll(&job_id).await.unwrap();
    assert_eq!(status.job_status, JobStatus::Queued);
}

#[tokio::test]
// Polling an unknown job ID must yield a not-found error, never a
// fabricated status.
async fn test_poll_unknown_job_is_not_found() {
    let (_state, base_url) = spawn_mock_platform().await;
    let client = client_for(&base_url, TEST_API_KEY);

    let result = client.poll("no-such-job").await;
    assert!(matches!(
        result,
        Err(ClientError::JobNotFound { job_id }) if job_id == "no-such-job"
    ));
}

#[tokio::test]
// Once a job is in a terminal state, repeated polls return the identical
// status tuple.
async fn test_poll_is_idempotent_after_completion() {
    let (_state, base_url) = spawn_mock_platform().await;
    let client = client_for(&base_url, TEST_API_KEY);

    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&dir);
    let config = JobConfig::Mmpbsa(MmPbsaParams::new(":10-20"));
    let job_id = client.submit(&archive, &config).await.unwrap();

    // Walk the job to success.
    let mut status = client.poll(&job_id).await.unwrap();
    while !status.job_status.is_terminal() {
        status = client.poll(&job_id).await.unwrap();
    }

    let again = client.poll(&job_id).await.unwrap();
    assert_eq!(status, again);
}

#[tokio::test]
// A rejected API key surfaces as an authentication error.
async fn test_rejected_api_key() {
    let (_state, base_url) = spawn_mock_platform().await;
    let client = client_for(&base_url, "wrong-key");

    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&dir);
    let config = JobConfig::Analysis(AnalysisParams::default());

    let result = client.submit(&archive, &config).await;
    assert!(matches!(result, Err(ClientError::Auth { .. })));
}

#[tokio::test]
// A nonexistent input path fails before any network call is attempted.
async fn test_missing_file_fails_without_network() {
    let (state, base_url) = spawn_mock_platform().await;
    let client = client_for(&base_url, TEST_API_KEY);

    let config = JobConfig::Mmpbsa(MmPbsaParams::new(":10-20"));
    let result = client
        .submit(std::path::Path::new("/no/such/traj.zip"), &config)
        .await;

    assert!(matches!(result, Err(ClientError::InputFile { .. })));
    assert_eq!(state.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
// An mmpbsa config with an empty ligand mask is rejected locally, before
// any request goes out.
async fn test_empty_ligand_mask_rejected_locally() {
    let (state, base_url) = spawn_mock_platform().await;
    let client = client_for(&base_url, TEST_API_KEY);

    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&dir);
    let config = JobConfig::Mmpbsa(MmPbsaParams::new(""));

    let result = client.submit(&archive, &config).await;
    assert!(matches!(result, Err(ClientError::InvalidConfig { .. })));
    assert_eq!(state.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
// Parameters the client does not pre-validate are still rejected by the
// service, and surface as a validation error.
async fn test_server_side_validation_surfaces_as_invalid_config() {
    let (_state, base_url) = spawn_mock_platform().await;
    let client = client_for(&base_url, TEST_API_KEY);

    let dir = tempfile::tempdir().unwrap();
    let archive = write_archive(&dir);
    let mut params = MmPbsaParams::new(":10-20");
    params.igb = 99;
    let config = JobConfig::Mmpbsa(params);

    let result = client.submit(&archive, &config).await;
    assert!(matches!(
        result,
        Err(ClientError::InvalidConfig { message }) if message.contains("igb")
    ));
}
