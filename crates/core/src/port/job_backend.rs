// Job Backend Port (Interface)
// The remote workspace endpoint. Transport, retries and wire format belong to
// the implementation.

use crate::domain::{
    DiagnosticIdentifier, JobDetails, JobFilter, JobId, Page, PageCursor, ProviderStatus, Quota,
};
use crate::error::Result;
use crate::port::token_provider::AccessToken;
use async_trait::async_trait;

/// Per-request values every call to the backend must carry
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub access_token: AccessToken,
    pub diagnostic_id: DiagnosticIdentifier,
}

/// Remote workspace endpoint
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Register a new job. Returns the accepted snapshot.
    async fn create_job(&self, ctx: &RequestContext, details: &JobDetails) -> Result<JobDetails>;

    /// Fetch the current snapshot of a job
    ///
    /// # Errors
    /// - `ClientError::NotFound` if the job is unknown
    async fn get_job(&self, ctx: &RequestContext, id: &JobId) -> Result<JobDetails>;

    /// Request cancellation of a job
    ///
    /// # Errors
    /// - `ClientError::Conflict` if the job already reached a terminal status
    async fn cancel_job(&self, ctx: &RequestContext, id: &JobId) -> Result<()>;

    /// Fetch one page of jobs
    async fn list_jobs(
        &self,
        ctx: &RequestContext,
        filter: &JobFilter,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<JobDetails>>;

    /// Fetch one page of quotas
    async fn list_quotas(
        &self,
        ctx: &RequestContext,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<Quota>>;

    /// Fetch one page of provider statuses
    async fn list_provider_status(
        &self,
        ctx: &RequestContext,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<ProviderStatus>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::JobStatus;
    use crate::error::ClientError;
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Mutex;

    /// Number of calls per backend operation
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct CallCounts {
        pub create: usize,
        pub get: usize,
        pub cancel: usize,
        pub list_jobs: usize,
        pub list_quotas: usize,
        pub list_provider_status: usize,
    }

    struct MockJob {
        details: JobDetails,
        // Status applied on each successive get_job, front first
        scripted: VecDeque<JobStatus>,
    }

    #[derive(Default)]
    struct MockState {
        jobs: BTreeMap<JobId, MockJob>,
        order: Vec<JobId>,
        quotas: Vec<Quota>,
        providers: Vec<ProviderStatus>,
        calls: CallCounts,
        contexts: Vec<RequestContext>,
        fail_next: Option<(u16, String)>,
    }

    /// In-memory workspace with scripted status transitions
    pub struct InMemoryJobBackend {
        state: Mutex<MockState>,
        page_size: usize,
    }

    impl InMemoryJobBackend {
        pub fn new(page_size: usize) -> Self {
            Self {
                state: Mutex::new(MockState::default()),
                page_size: page_size.max(1),
            }
        }

        pub fn with_quotas(self, quotas: Vec<Quota>) -> Self {
            self.state.lock().unwrap().quotas = quotas;
            self
        }

        pub fn with_providers(self, providers: Vec<ProviderStatus>) -> Self {
            self.state.lock().unwrap().providers = providers;
            self
        }

        /// Seed a job as if it had been submitted earlier
        pub fn insert_job(&self, details: JobDetails) {
            let mut state = self.state.lock().unwrap();
            let id = details.id.clone();
            if !state.jobs.contains_key(&id) {
                state.order.push(id.clone());
            }
            state.jobs.insert(
                id,
                MockJob {
                    details,
                    scripted: VecDeque::new(),
                },
            );
        }

        /// Queue statuses returned by successive `get_job` calls. The last
        /// one sticks.
        pub fn script_statuses(&self, id: &JobId, statuses: Vec<JobStatus>) {
            let mut state = self.state.lock().unwrap();
            if let Some(job) = state.jobs.get_mut(id) {
                job.scripted = statuses.into();
            }
        }

        /// Change a job's status server-side without a client call
        pub fn set_status(&self, id: &JobId, status: JobStatus) {
            let mut state = self.state.lock().unwrap();
            if let Some(job) = state.jobs.get_mut(id) {
                job.scripted.clear();
                apply_status(&mut job.details, status);
            }
        }

        /// Make the next call fail with a server error
        pub fn fail_next(&self, status: u16, message: impl Into<String>) {
            self.state.lock().unwrap().fail_next = Some((status, message.into()));
        }

        pub fn calls(&self) -> CallCounts {
            self.state.lock().unwrap().calls.clone()
        }

        /// Request contexts of every call, in order
        pub fn contexts(&self) -> Vec<RequestContext> {
            self.state.lock().unwrap().contexts.clone()
        }

        pub fn status_of(&self, id: &JobId) -> Option<JobStatus> {
            let state = self.state.lock().unwrap();
            state.jobs.get(id).map(|job| job.details.status.clone())
        }

        fn enter(&self, ctx: &RequestContext) -> std::sync::MutexGuard<'_, MockState> {
            let mut state = self.state.lock().unwrap();
            state.contexts.push(ctx.clone());
            state
        }
    }

    fn take_failure(state: &mut MockState) -> Result<()> {
        match state.fail_next.take() {
            Some((status, message)) => Err(ClientError::Server { status, message }),
            None => Ok(()),
        }
    }

    fn apply_status(details: &mut JobDetails, status: JobStatus) {
        let now = chrono::Utc::now();
        if status == JobStatus::Executing && details.begin_execution_time.is_none() {
            details.begin_execution_time = Some(now);
        }
        if status.is_terminal() && details.end_execution_time.is_none() {
            details.end_execution_time = Some(now);
        }
        details.status = status;
    }

    fn paginate<T: Clone>(items: &[T], cursor: Option<&PageCursor>, page_size: usize) -> Result<Page<T>> {
        let offset = match cursor {
            Some(c) => c
                .as_str()
                .parse::<usize>()
                .map_err(|_| ClientError::InvalidArgument(format!("Invalid cursor: {}", c)))?,
            None => 0,
        };
        let end = (offset + page_size).min(items.len());
        let page_items = items.get(offset..end).unwrap_or_default().to_vec();
        let next = (end < items.len()).then(|| PageCursor::new(end.to_string()));
        Ok(Page::new(page_items, next))
    }

    #[async_trait]
    impl JobBackend for InMemoryJobBackend {
        async fn create_job(&self, ctx: &RequestContext, details: &JobDetails) -> Result<JobDetails> {
            let mut state = self.enter(ctx);
            state.calls.create += 1;
            take_failure(&mut state)?;

            if details.id.is_empty() {
                return Err(ClientError::InvalidArgument("Job id must not be empty".into()));
            }
            if let Some(existing) = state.jobs.get(&details.id) {
                if !existing.details.status.is_terminal() {
                    return Err(ClientError::InvalidArgument(format!(
                        "Job id {} is already in use",
                        details.id
                    )));
                }
                return Err(ClientError::Conflict(format!(
                    "Job {} already exists",
                    details.id
                )));
            }

            let mut accepted = details.clone();
            accepted.status = JobStatus::Waiting;
            accepted.creation_time = Some(chrono::Utc::now());
            accepted.begin_execution_time = None;
            accepted.end_execution_time = None;
            accepted.error_data = None;

            state.order.push(accepted.id.clone());
            state.jobs.insert(
                accepted.id.clone(),
                MockJob {
                    details: accepted.clone(),
                    scripted: VecDeque::new(),
                },
            );
            Ok(accepted)
        }

        async fn get_job(&self, ctx: &RequestContext, id: &JobId) -> Result<JobDetails> {
            let mut state = self.enter(ctx);
            state.calls.get += 1;
            take_failure(&mut state)?;

            let job = state
                .jobs
                .get_mut(id)
                .ok_or_else(|| ClientError::NotFound(format!("Job {} not found", id)))?;
            if let Some(next) = job.scripted.pop_front() {
                apply_status(&mut job.details, next);
            }
            Ok(job.details.clone())
        }

        async fn cancel_job(&self, ctx: &RequestContext, id: &JobId) -> Result<()> {
            let mut state = self.enter(ctx);
            state.calls.cancel += 1;
            take_failure(&mut state)?;

            let job = state
                .jobs
                .get_mut(id)
                .ok_or_else(|| ClientError::NotFound(format!("Job {} not found", id)))?;
            if job.details.status.is_terminal() {
                return Err(ClientError::Conflict(format!(
                    "Job {} already finished with status {}",
                    id, job.details.status
                )));
            }
            job.scripted.clear();
            apply_status(&mut job.details, JobStatus::Cancelled);
            Ok(())
        }

        async fn list_jobs(
            &self,
            ctx: &RequestContext,
            filter: &JobFilter,
            cursor: Option<&PageCursor>,
        ) -> Result<Page<JobDetails>> {
            let mut state = self.enter(ctx);
            state.calls.list_jobs += 1;
            take_failure(&mut state)?;

            let matching: Vec<JobDetails> = state
                .order
                .iter()
                .filter_map(|id| state.jobs.get(id))
                .map(|job| job.details.clone())
                .filter(|details| filter.matches(details))
                .collect();
            paginate(&matching, cursor, self.page_size)
        }

        async fn list_quotas(
            &self,
            ctx: &RequestContext,
            cursor: Option<&PageCursor>,
        ) -> Result<Page<Quota>> {
            let mut state = self.enter(ctx);
            state.calls.list_quotas += 1;
            take_failure(&mut state)?;
            paginate(&state.quotas, cursor, self.page_size)
        }

        async fn list_provider_status(
            &self,
            ctx: &RequestContext,
            cursor: Option<&PageCursor>,
        ) -> Result<Page<ProviderStatus>> {
            let mut state = self.enter(ctx);
            state.calls.list_provider_status += 1;
            take_failure(&mut state)?;
            paginate(&state.providers, cursor, self.page_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::InMemoryJobBackend;
    use super::*;
    use crate::domain::JobStatus;
    use crate::error::ClientError;

    fn ctx() -> RequestContext {
        RequestContext {
            access_token: AccessToken::new("t"),
            diagnostic_id: DiagnosticIdentifier::compose(Some("test"), None),
        }
    }

    fn job(id: &str) -> JobDetails {
        let mut details = JobDetails::new("target", "provider", "in", "out");
        details.id = JobId::new(id);
        details
    }

    #[tokio::test]
    async fn test_scripted_statuses_advance_per_get() {
        let backend = InMemoryJobBackend::new(10);
        backend.create_job(&ctx(), &job("a")).await.unwrap();
        backend.script_statuses(&JobId::new("a"), vec![JobStatus::Executing, JobStatus::Succeeded]);

        let id = JobId::new("a");
        assert_eq!(backend.get_job(&ctx(), &id).await.unwrap().status, JobStatus::Executing);
        assert_eq!(backend.get_job(&ctx(), &id).await.unwrap().status, JobStatus::Succeeded);
        assert_eq!(backend.get_job(&ctx(), &id).await.unwrap().status, JobStatus::Succeeded);
        assert_eq!(backend.calls().get, 3);
    }

    #[tokio::test]
    async fn test_cancel_terminal_job_conflicts() {
        let backend = InMemoryJobBackend::new(10);
        backend.create_job(&ctx(), &job("a")).await.unwrap();
        backend.set_status(&JobId::new("a"), JobStatus::Failed);

        let err = backend.cancel_job(&ctx(), &JobId::new("a")).await.unwrap_err();
        assert!(matches!(err, ClientError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_active_id_is_rejected() {
        let backend = InMemoryJobBackend::new(10);
        backend.create_job(&ctx(), &job("a")).await.unwrap();
        let err = backend.create_job(&ctx(), &job("a")).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_pagination_cursor_offsets() {
        let backend = InMemoryJobBackend::new(2);
        for id in ["a", "b", "c"] {
            backend.create_job(&ctx(), &job(id)).await.unwrap();
        }
        let filter = JobFilter::default();

        let first = backend.list_jobs(&ctx(), &filter, None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        let cursor = first.next.expect("second page");

        let second = backend.list_jobs(&ctx(), &filter, Some(&cursor)).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id.as_str(), "c");
        assert!(second.is_last());
    }

    #[tokio::test]
    async fn test_injected_failure_is_one_shot() {
        let backend = InMemoryJobBackend::new(2);
        backend.fail_next(503, "unavailable");
        let err = backend.list_quotas(&ctx(), None).await.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 503, .. }));
        assert!(backend.list_quotas(&ctx(), None).await.is_ok());
    }
}
