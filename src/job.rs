//! Job model for the SimAtomic platform.
//!
//! A job is a single remote computation (trajectory analysis or MM-PBSA
//! energy calculation) identified by an opaque server-assigned ID. The
//! configuration is a tagged union over the two job modes, with the legal
//! parameter set of each mode checked at construction time instead of being
//! deferred to the service.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// The job mode, selecting which computation and parameter set a job uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    Analysis,
    Mmpbsa,
}

impl Display for JobMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JobMode::Analysis => write!(f, "analysis"),
            JobMode::Mmpbsa => write!(f, "mmpbsa"),
        }
    }
}

/// Job configuration, tagged by the required `mode` field.
///
/// Unknown keys and unknown modes are rejected when deserializing, so a
/// malformed configuration fails before it ever reaches the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum JobConfig {
    Analysis(AnalysisParams),
    Mmpbsa(MmPbsaParams),
}

impl JobConfig {
    pub fn mode(&self) -> JobMode {
        match self {
            JobConfig::Analysis(_) => JobMode::Analysis,
            JobConfig::Mmpbsa(_) => JobMode::Mmpbsa,
        }
    }

    /// Parse a configuration from JSON, rejecting unknown keys and modes.
    pub fn from_json(json: &str) -> Result<Self, InvalidJobConfig> {
        let config: JobConfig =
            serde_json::from_str(json).map_err(|e| InvalidJobConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check constraints that the type system alone cannot express.
    pub fn validate(&self) -> Result<(), InvalidJobConfig> {
        match self {
            JobConfig::Analysis(_) => Ok(()),
            JobConfig::Mmpbsa(params) => {
                if params.ligand_chain_mask.trim().is_empty() {
                    return Err(InvalidJobConfig(
                        "ligand_chain_mask is required for mmpbsa jobs".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// A configuration that cannot be submitted as-is.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid job configuration: {0}")]
pub struct InvalidJobConfig(pub String);

/// Parameters for trajectory ensemble analysis (TICA + clustering).
///
/// Defaults match the ones the platform applies when a field is omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisParams {
    /// First trajectory frame to analyze.
    #[serde(default)]
    pub start_frame: u32,

    /// MDAnalysis-style atom selection used for the analysis.
    #[serde(default = "default_atom_selection")]
    pub atom_selection: String,

    /// TICA lag time, in frames.
    #[serde(default = "default_tica_lag_time")]
    pub tica_lag_time: u32,

    /// Number of TICA components to keep.
    #[serde(default = "default_tica_dimensions")]
    pub tica_dimensions: u32,

    /// Minimum cluster size for HDBSCAN.
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: u32,

    /// Minimum samples for HDBSCAN.
    #[serde(default = "default_min_samples")]
    pub min_samples: u32,

    /// Maximum time for the autocorrelation estimate. None lets the platform
    /// pick one.
    #[serde(default)]
    pub autocorr_maxtime: Option<u32>,

    #[serde(default)]
    pub autocorr_threshold: f64,

    #[serde(default = "default_autocorr_component")]
    pub autocorr_component: u32,

    /// Filename of the generated ensemble dashboard inside the result bundle.
    #[serde(default = "default_ensemble_output_path")]
    pub ensemble_output_path: String,

    /// Filename of the generated RMSD plots inside the result bundle.
    #[serde(default = "default_rmsd_output_path")]
    pub rmsd_output_path: String,
}

fn default_atom_selection() -> String {
    "name CA".to_string()
}

fn default_tica_lag_time() -> u32 {
    30
}

fn default_tica_dimensions() -> u32 {
    5
}

fn default_min_cluster_size() -> u32 {
    10
}

fn default_min_samples() -> u32 {
    10
}

fn default_autocorr_component() -> u32 {
    4
}

fn default_ensemble_output_path() -> String {
    "ensemble_analysis_dashboard.html".to_string()
}

fn default_rmsd_output_path() -> String {
    "protein_ligand_rmsd_plots.html".to_string()
}

impl Default for AnalysisParams {
    fn default() -> Self {
        AnalysisParams {
            start_frame: 0,
            atom_selection: default_atom_selection(),
            tica_lag_time: default_tica_lag_time(),
            tica_dimensions: default_tica_dimensions(),
            min_cluster_size: default_min_cluster_size(),
            min_samples: default_min_samples(),
            autocorr_maxtime: None,
            autocorr_threshold: 0.0,
            autocorr_component: default_autocorr_component(),
            ensemble_output_path: default_ensemble_output_path(),
            rmsd_output_path: default_rmsd_output_path(),
        }
    }
}

/// Parameters for an MM-PBSA binding free-energy calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MmPbsaParams {
    /// Stride when converting the trajectory to NetCDF.
    #[serde(default = "default_mmpbsa_stride")]
    pub mmpbsa_stride: u32,

    /// First frame to analyze.
    #[serde(default)]
    pub mmpbsa_startframe: u32,

    /// Last frame to analyze.
    #[serde(default = "default_mmpbsa_endframe")]
    pub mmpbsa_endframe: u32,

    /// Interval between analyzed frames.
    #[serde(default = "default_mmpbsa_interval")]
    pub mmpbsa_interval: u32,

    /// Generalized Born model. 5 or 8 are common for protein-protein
    /// interactions.
    #[serde(default = "default_igb")]
    pub igb: u32,

    /// Enable per-residue energy decomposition.
    #[serde(default)]
    pub use_decomp: bool,

    /// Decomposition scheme, only used when `use_decomp` is set.
    #[serde(default = "default_decomp_idecomp")]
    pub decomp_idecomp: u32,

    /// Strip mask written into mmpbsa.in.
    #[serde(default)]
    pub strip_mask_input: String,

    /// Strip mask entries passed to ante-MMPBSA.
    #[serde(default)]
    pub strip_mask_items: Vec<String>,

    /// Amber mask selecting the ligand residues, e.g. ":100-110".
    /// Required, the platform has no default for it.
    pub ligand_chain_mask: String,
}

fn default_mmpbsa_stride() -> u32 {
    100
}

fn default_mmpbsa_endframe() -> u32 {
    1000
}

fn default_mmpbsa_interval() -> u32 {
    100
}

fn default_igb() -> u32 {
    5
}

fn default_decomp_idecomp() -> u32 {
    3
}

impl MmPbsaParams {
    /// Create parameters with platform defaults and the given ligand mask.
    pub fn new(ligand_chain_mask: impl Into<String>) -> Self {
        MmPbsaParams {
            mmpbsa_stride: default_mmpbsa_stride(),
            mmpbsa_startframe: 0,
            mmpbsa_endframe: default_mmpbsa_endframe(),
            mmpbsa_interval: default_mmpbsa_interval(),
            igb: default_igb(),
            use_decomp: false,
            decomp_idecomp: default_decomp_idecomp(),
            strip_mask_input: String::new(),
            strip_mask_items: Vec::new(),
            ligand_chain_mask: ligand_chain_mask.into(),
        }
    }
}

/// Job lifecycle state as reported by the platform.
///
/// The server owns the lifecycle (`queued → running → success|failed`); the
/// client only ever observes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Success,
    Failed,
}

impl JobStatus {
    /// Whether the job has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Success => write!(f, "success"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "success" => Ok(JobStatus::Success),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!("Unknown job status: {}", s)),
        }
    }
}

/// Point-in-time job status returned by `poll`.
///
/// On success, `message` carries the download URL of the result artifact;
/// otherwise it is empty or diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub job_status: JobStatus,
    #[serde(default)]
    pub message: String,
}
