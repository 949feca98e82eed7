//! Job domain types
//!
//! A job is owned by the backend and only referenced here by its opaque
//! id. What the client holds is a [`JobSnapshot`]: the latest status seen,
//! re-fetched on every poll tick.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::phase::ResearchPhase;
use crate::domain::research::ResearchResult;
use crate::dto::status::StatusResponse;

/// Error text used when the backend reports a failure without a message
pub const UNKNOWN_JOB_ERROR: &str = "Unknown error occurred";

/// Job status as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    /// Terminal statuses have no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Status together with the payload only that status may carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Processing,
    Completed(ResearchResult),
    Error(String),
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Queued => JobStatus::Queued,
            JobState::Processing => JobStatus::Processing,
            JobState::Completed(_) => JobStatus::Completed,
            JobState::Error(_) => JobStatus::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }
}

/// A status response that cannot be turned into a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("job reported completed without a result")]
    MissingResult,
}

/// Validated point-in-time view of a job
///
/// `result()` is `Some` iff the status is `completed`, and `error()` is
/// `Some` iff the status is `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub job_id: Option<String>,
    pub progress: Option<String>,
    pub current_step: Option<String>,
    pub logs: Vec<String>,
    pub state: JobState,
}

impl JobSnapshot {
    /// Snapshot with just a state and no progress information
    pub fn new(state: JobState) -> Self {
        Self {
            job_id: None,
            progress: None,
            current_step: None,
            logs: Vec::new(),
            state,
        }
    }

    pub fn with_progress(mut self, progress: impl Into<String>) -> Self {
        self.progress = Some(progress.into());
        self
    }

    pub fn status(&self) -> JobStatus {
        self.state.status()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn result(&self) -> Option<&ResearchResult> {
        match &self.state {
            JobState::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            JobState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// The label that best describes what the backend is doing right now
    pub fn step_label(&self) -> Option<&str> {
        self.current_step.as_deref().or(self.progress.as_deref())
    }

    /// Pipeline phase implied by the step label
    pub fn phase(&self) -> ResearchPhase {
        match &self.state {
            JobState::Completed(_) => ResearchPhase::Complete,
            _ => self
                .step_label()
                .map_or(ResearchPhase::Starting, ResearchPhase::from_progress),
        }
    }
}

impl TryFrom<StatusResponse> for JobSnapshot {
    type Error = SnapshotError;

    /// Payloads attached to a status that may not carry them are dropped.
    fn try_from(resp: StatusResponse) -> Result<Self, Self::Error> {
        let state = match resp.status {
            JobStatus::Queued => JobState::Queued,
            JobStatus::Processing => JobState::Processing,
            JobStatus::Completed => {
                JobState::Completed(resp.result.ok_or(SnapshotError::MissingResult)?)
            }
            JobStatus::Error => JobState::Error(
                resp.error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_JOB_ERROR.to_string()),
            ),
        };

        Ok(Self {
            job_id: resp.job_id,
            progress: resp.progress,
            current_step: resp.current_step,
            logs: resp.logs.unwrap_or_default(),
            state,
        })
    }
}
