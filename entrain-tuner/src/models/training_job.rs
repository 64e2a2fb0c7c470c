//! Training job status and audit record
//!
//! A training job moves SUBMITTED → TRAINING → {TRAINED, IN_ERROR}.
//! TRAINED and IN_ERROR are terminal for the job instance; after either
//! the controller returns to idle. The job identifier doubles as the
//! recognizer identifier for the model the job produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Training job status as reported by the recognizer service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Job accepted, not yet training
    Submitted,
    /// Model training in progress
    Training,
    /// Training finished; the model is ready for promotion
    Trained,
    /// Training failed; the entity list should be quarantined
    InError,
    /// Any status this service does not recognize
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether this status ends the job's lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Trained | JobStatus::InError)
    }

    /// Wire representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Submitted => "SUBMITTED",
            JobStatus::Training => "TRAINING",
            JobStatus::Trained => "TRAINED",
            JobStatus::InError => "IN_ERROR",
            JobStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::str::FromStr for JobStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "SUBMITTED" => JobStatus::Submitted,
            "TRAINING" => JobStatus::Training,
            "TRAINED" => JobStatus::Trained,
            "IN_ERROR" => JobStatus::InError,
            _ => JobStatus::Unknown,
        })
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of one training run
///
/// Written when a job is submitted and updated on its terminal
/// transition. Retained indefinitely for operator inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRun {
    /// Job identifier (also the produced recognizer's identifier)
    pub job_id: String,
    /// Last observed status
    pub status: JobStatus,
    /// When the job was submitted
    pub submitted_at: DateTime<Utc>,
    /// When the job reached a terminal status, if it has
    pub resolved_at: Option<DateTime<Utc>>,
    /// Quarantine key of the entity list, for failed runs
    pub quarantine_key: Option<String>,
}

impl TrainingRun {
    /// New run in SUBMITTED state
    pub fn submitted(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Submitted,
            submitted_at: Utc::now(),
            resolved_at: None,
            quarantine_key: None,
        }
    }
}
