//! Job status DTO

use serde::{Deserialize, Serialize};

use crate::domain::job::JobStatus;
use crate::domain::research::ResearchResult;

/// Response body of `GET /api/status/{job_id}`, exactly as sent
///
/// The backend serializes absent fields as `null`, which deserialize to
/// `None` here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default)]
    pub result: Option<ResearchResult>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub logs: Option<Vec<String>>,
    #[serde(default)]
    pub current_step: Option<String>,
}

impl StatusResponse {
    /// A bare status with no payload
    pub fn new(status: JobStatus) -> Self {
        Self {
            job_id: None,
            status,
            progress: None,
            result: None,
            error: None,
            logs: None,
            current_step: None,
        }
    }
}
