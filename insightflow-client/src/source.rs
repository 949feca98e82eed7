//! Status source abstraction
//!
//! The poller only needs "give me the current snapshot of this job". Keeping
//! that behind a trait lets the poller run against the HTTP client in
//! production and against scripted fakes in tests.

use async_trait::async_trait;
use insightflow_core::domain::job::JobSnapshot;

use crate::InsightClient;
use crate::error::Result;

/// Anything that can produce the current snapshot of a job
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetches and validates the current status of `job_id`
    ///
    /// Any error is a failed poll tick: transport failures, non-2xx
    /// responses, unparseable bodies and invariant violations alike.
    async fn fetch_snapshot(&self, job_id: &str) -> Result<JobSnapshot>;
}

#[async_trait]
impl StatusSource for InsightClient {
    async fn fetch_snapshot(&self, job_id: &str) -> Result<JobSnapshot> {
        let response = self.get_status(job_id).await?;
        Ok(JobSnapshot::try_from(response)?)
    }
}
