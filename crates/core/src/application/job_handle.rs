// Cloud job handle - client-side view of one remote job

use super::cancellation::CancellationToken;
use super::polling::PollPolicy;
use super::session::WorkspaceSession;
use crate::domain::{JobDetails, JobId, JobStatus, WorkspaceContext};
use crate::error::{ClientError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Handle binding a job id to its workspace and the last fetched snapshot
///
/// Owned by the caller that created or fetched it. Several handles may poll
/// the same job independently; the remote side is the source of truth.
pub struct CloudJob {
    session: Arc<WorkspaceSession>,
    details: JobDetails,
}

impl CloudJob {
    pub(crate) fn new(session: Arc<WorkspaceSession>, details: JobDetails) -> Self {
        Self { session, details }
    }

    pub fn id(&self) -> &JobId {
        &self.details.id
    }

    pub fn details(&self) -> &JobDetails {
        &self.details
    }

    /// Last known status
    pub fn status(&self) -> &JobStatus {
        &self.details.status
    }

    pub fn is_terminal(&self) -> bool {
        self.details.status.is_terminal()
    }

    pub fn has_succeeded(&self) -> bool {
        self.details.status == JobStatus::Succeeded
    }

    pub fn workspace(&self) -> &WorkspaceContext {
        self.session.workspace()
    }

    /// Re-fetch the snapshot from the remote side
    pub async fn refresh(&mut self) -> Result<()> {
        let details = self.session.fetch_job(&self.details.id).await?;
        debug!(job_id = %details.id, status = %details.status, "Job refreshed");
        self.details = details;
        Ok(())
    }

    /// Poll with the default backoff until the job reaches a terminal status.
    ///
    /// Returns the terminal status, which may be `Failed` or `Cancelled`.
    ///
    /// # Errors
    /// - `ClientError::Timeout` once `timeout` elapses
    /// - `ClientError::OperationCancelled` once `cancel` fires
    ///
    /// Neither touches the remote job; the last known snapshot is kept.
    pub async fn wait_until_terminal(
        &mut self,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<JobStatus> {
        self.wait_with_policy(&PollPolicy::default(), timeout, cancel)
            .await
    }

    /// [`wait_until_terminal`](Self::wait_until_terminal) with a custom cadence
    pub async fn wait_with_policy(
        &mut self,
        policy: &PollPolicy,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<JobStatus> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut interval = policy.initial_interval();
        let session = Arc::clone(&self.session);
        let id = self.details.id.clone();

        loop {
            if self.is_terminal() {
                info!(job_id = %id, status = %self.details.status, "Job reached terminal status");
                return Ok(self.details.status.clone());
            }

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.wait_cancelled()),
                _ = deadline_elapsed(deadline) => return Err(self.wait_timed_out(timeout)),
                fetched = session.fetch_job(&id) => fetched?,
            };
            debug!(job_id = %id, status = %fetched.status, "Job refreshed");
            self.details = fetched;

            if self.is_terminal() {
                continue;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.wait_cancelled()),
                _ = deadline_elapsed(deadline) => return Err(self.wait_timed_out(timeout)),
                _ = tokio::time::sleep(interval) => {}
            }
            interval = policy.next_interval(interval);
        }
    }

    /// Request remote cancellation
    ///
    /// # Errors
    /// - `ClientError::Conflict` if the remote job already finished. The
    ///   snapshot is left as it was.
    pub async fn cancel(&mut self) -> Result<()> {
        let ctx = self.session.request_context().await?;
        match self.session.backend().cancel_job(&ctx, &self.details.id).await {
            Ok(()) => {
                info!(job_id = %self.details.id, "Job cancellation requested");
                self.refresh().await
            }
            Err(e) => {
                if e.is_conflict() {
                    warn!(
                        job_id = %self.details.id,
                        status = %self.details.status,
                        "Job already finalized, cancellation rejected"
                    );
                }
                Err(e)
            }
        }
    }

    fn wait_cancelled(&self) -> ClientError {
        info!(job_id = %self.details.id, status = %self.details.status, "Wait cancelled");
        ClientError::OperationCancelled
    }

    fn wait_timed_out(&self, timeout: Option<Duration>) -> ClientError {
        let timeout = timeout.unwrap_or_default();
        warn!(
            job_id = %self.details.id,
            status = %self.details.status,
            timeout_ms = timeout.as_millis() as u64,
            "Wait timed out"
        );
        ClientError::Timeout(timeout)
    }
}

impl std::fmt::Debug for CloudJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudJob")
            .field("workspace", self.session.workspace())
            .field("details", &self.details)
            .finish()
    }
}

async fn deadline_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
