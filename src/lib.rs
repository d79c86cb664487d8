//! SimAtomic Client
//!
//! A client library for the SimAtomic platform, allowing molecular-dynamics
//! analysis jobs (trajectory clustering, MM-PBSA binding free-energy
//! calculations) to be submitted to the cloud and polled for completion.
//!
//! The scientific work happens entirely server-side; this crate only uploads
//! the input archive, queues the job, and observes its status.
//!
//! ```no_run
//! use simatomic_client::api::{JobService, SimAtomicClient};
//! use simatomic_client::job::{JobConfig, JobStatus, MmPbsaParams};
//!
//! # async fn run() -> Result<(), simatomic_client::api::ClientError> {
//! let client = SimAtomicClient::new("1234567890");
//! let config = JobConfig::Mmpbsa(MmPbsaParams::new(":100-110"));
//!
//! let archive = std::path::Path::new("path/to/mmpbsa_input.zip");
//! let job_id = client.submit(archive, &config).await?;
//!
//! loop {
//!     let status = client.poll(&job_id).await?;
//!     match status.job_status {
//!         JobStatus::Success => {
//!             println!("results: {}", status.message);
//!             break;
//!         }
//!         JobStatus::Failed => break,
//!         _ => tokio::time::sleep(std::time::Duration::from_secs(30)).await,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod environment;
pub mod job;

pub use api::{ClientError, JobService, SimAtomicClient};
pub use environment::Environment;
pub use job::{AnalysisParams, JobConfig, JobStatus, JobStatusResponse, MmPbsaParams};
