// Job Client - submit / get / cancel / list against one workspace

use super::constants::{
    PAYLOAD_BLOB_NAME, PAYLOAD_CONTAINER_PREFIX, PAYLOAD_CONTENT_ENCODING, PAYLOAD_CONTENT_TYPE,
};
use super::job_handle::CloudJob;
use super::listing::{JobPages, ProviderStatusPages, QuotaPages};
use super::paging::PagedLister;
use super::payload;
use super::session::WorkspaceSession;
use crate::domain::{
    validate_app_id, DiagnosticIdentifier, DomainError, JobDetails, JobFilter, JobId,
    PayloadLocation, ProviderStatus, Quota, WorkspaceContext, APP_ID_ENV_VAR,
};
use crate::error::{ClientError, Result};
use crate::port::{BlobUpload, BlobUploader, IdProvider, JobBackend, TokenProvider, UuidProvider};
use std::sync::Arc;
use tracing::info;

/// Client for one workspace identity
///
/// Built once; its configuration and diagnostic identifier never change and
/// are shared with every handle and lister it creates.
pub struct JobClient {
    session: Arc<WorkspaceSession>,
    id_provider: Arc<dyn IdProvider>,
    uploader: Option<Arc<dyn BlobUploader>>,
}

impl JobClient {
    pub fn builder(
        workspace: WorkspaceContext,
        backend: Arc<dyn JobBackend>,
        credential: Arc<dyn TokenProvider>,
    ) -> JobClientBuilder {
        JobClientBuilder {
            workspace,
            backend,
            credential,
            app_id: None,
            env_app_id: None,
            id_provider: Arc::new(UuidProvider),
            uploader: None,
        }
    }

    pub fn workspace(&self) -> &WorkspaceContext {
        self.session.workspace()
    }

    pub fn diagnostic_id(&self) -> &DiagnosticIdentifier {
        self.session.diagnostic_id()
    }

    /// Register a job whose payload already lives at `location`
    ///
    /// # Errors
    /// - `ClientError::InvalidArgument` if `job_id` is empty, or whatever the
    ///   remote side reports for an id collision
    pub async fn submit(
        &self,
        location: PayloadLocation,
        job_id: impl Into<JobId>,
        mut details: JobDetails,
    ) -> Result<CloudJob> {
        let job_id = job_id.into();
        if job_id.is_empty() {
            return Err(DomainError::EmptyJobId.into());
        }
        details.assign(job_id, location);

        let ctx = self.session.request_context().await?;
        let accepted = self.session.backend().create_job(&ctx, &details).await?;

        info!(
            job_id = %accepted.id,
            target = %accepted.target,
            provider_id = %accepted.provider_id,
            "Job submitted"
        );
        Ok(CloudJob::new(Arc::clone(&self.session), accepted))
    }

    /// Compress and upload `payload`, then submit it under a fresh job id
    ///
    /// # Errors
    /// - `ClientError::NotConfigured` if no blob uploader was configured
    pub async fn submit_problem(&self, payload: &[u8], details: JobDetails) -> Result<CloudJob> {
        let uploader = self.uploader.as_ref().ok_or_else(|| {
            ClientError::NotConfigured("no blob uploader configured for payload upload".into())
        })?;

        let job_id = JobId::new(self.id_provider.generate_id());
        let data = payload::compress(payload)?;
        info!(
            job_id = %job_id,
            raw_bytes = payload.len(),
            compressed_bytes = data.len(),
            "Uploading problem payload"
        );

        let location = uploader
            .upload(BlobUpload {
                container: format!("{}{}", PAYLOAD_CONTAINER_PREFIX, job_id),
                blob_name: PAYLOAD_BLOB_NAME.to_string(),
                content_type: PAYLOAD_CONTENT_TYPE.to_string(),
                content_encoding: Some(PAYLOAD_CONTENT_ENCODING.to_string()),
                data,
            })
            .await?;

        self.submit(location, job_id, details).await
    }

    /// Fetch the current snapshot of a job
    pub async fn get(&self, job_id: impl Into<JobId>) -> Result<CloudJob> {
        let job_id = job_id.into();
        let details = self.session.fetch_job(&job_id).await?;
        Ok(CloudJob::new(Arc::clone(&self.session), details))
    }

    /// Request remote cancellation of `job`, see [`CloudJob::cancel`]
    pub async fn cancel(&self, job: &mut CloudJob) -> Result<()> {
        job.cancel().await
    }

    pub fn list_jobs(&self, filter: JobFilter) -> PagedLister<CloudJob> {
        PagedLister::new(JobPages::new(Arc::clone(&self.session), filter))
    }

    pub fn list_quotas(&self) -> PagedLister<Quota> {
        PagedLister::new(QuotaPages::new(Arc::clone(&self.session)))
    }

    pub fn list_provider_status(&self) -> PagedLister<ProviderStatus> {
        PagedLister::new(ProviderStatusPages::new(Arc::clone(&self.session)))
    }
}

/// Builder for [`JobClient`]
pub struct JobClientBuilder {
    workspace: WorkspaceContext,
    backend: Arc<dyn JobBackend>,
    credential: Arc<dyn TokenProvider>,
    app_id: Option<String>,
    env_app_id: Option<String>,
    id_provider: Arc<dyn IdProvider>,
    uploader: Option<Arc<dyn BlobUploader>>,
}

impl JobClientBuilder {
    /// Caller-supplied application id
    ///
    /// # Errors
    /// - `ClientError::InvalidArgument` if longer than 24 characters
    pub fn app_id(mut self, app_id: impl Into<String>) -> Result<Self> {
        let app_id = app_id.into();
        validate_app_id(&app_id)?;
        self.app_id = Some(app_id);
        Ok(self)
    }

    /// Environment-level application id
    pub fn env_app_id(mut self, env_app_id: Option<String>) -> Self {
        self.env_app_id = env_app_id;
        self
    }

    /// Read the environment-level application id from `QUASAR_APP_ID`
    pub fn env_app_id_from_env(self) -> Self {
        let env_app_id = std::env::var(APP_ID_ENV_VAR).ok();
        self.env_app_id(env_app_id)
    }

    pub fn id_provider(mut self, id_provider: Arc<dyn IdProvider>) -> Self {
        self.id_provider = id_provider;
        self
    }

    pub fn uploader(mut self, uploader: Arc<dyn BlobUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn build(self) -> JobClient {
        let diagnostic_id =
            DiagnosticIdentifier::compose(self.app_id.as_deref(), self.env_app_id.as_deref());
        info!(
            workspace = %self.workspace,
            app_id = %diagnostic_id,
            "Job client ready"
        );

        JobClient {
            session: Arc::new(WorkspaceSession::new(
                self.workspace,
                self.backend,
                self.credential,
                diagnostic_id,
            )),
            id_provider: self.id_provider,
            uploader: self.uploader,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JobStatus, Page};
    use crate::port::blob_uploader::mocks::InMemoryBlobStore;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::job_backend::mocks::InMemoryJobBackend;
    use crate::port::StaticTokenProvider;
    use tokio_test::{assert_err, assert_ok};

    fn workspace() -> WorkspaceContext {
        WorkspaceContext::new("sub", "rg", "ws", "westus")
    }

    fn client_with(backend: Arc<InMemoryJobBackend>) -> JobClient {
        JobClient::builder(workspace(), backend, Arc::new(StaticTokenProvider::new("token")))
            .app_id("OptionAppId")
            .unwrap()
            .env_app_id(Some("EnvVarAppId".to_string()))
            .build()
    }

    fn details() -> JobDetails {
        JobDetails::new("microsoft.simulatedannealing.cpu", "Microsoft", "ising.v1", "result.v1")
    }

    fn location(id: &str) -> PayloadLocation {
        PayloadLocation::new(format!("https://store/job-{id}"), format!("https://store/job-{id}/inputData"))
    }

    fn quota(dimension: &str) -> Quota {
        Quota {
            dimension: dimension.into(),
            scope: "Workspace".into(),
            provider_id: "Microsoft".into(),
            utilization: 1.0,
            holds: 0.0,
            limit: 10.0,
            period: "Monthly".into(),
        }
    }

    #[test]
    fn test_overlong_app_id_rejected_at_assignment() {
        let backend = Arc::new(InMemoryJobBackend::new(10));
        let result = JobClient::builder(workspace(), backend, Arc::new(StaticTokenProvider::new("t")))
            .app_id("VeryVeryVeryVeryVeryVeryLongOptionAppId");

        assert!(matches!(result, Err(ClientError::InvalidArgument(_))));
    }

    #[test]
    fn test_diagnostic_id_composed_once() {
        let client = client_with(Arc::new(InMemoryJobBackend::new(10)));
        assert_eq!(client.diagnostic_id().as_str(), "OptionAppId-EnvVarAppId");
    }

    #[tokio::test]
    async fn test_every_request_carries_token_and_diagnostic_id() {
        let backend = Arc::new(InMemoryJobBackend::new(10));
        let client = client_with(backend.clone());

        let mut job = client.submit(location("a"), "a", details()).await.unwrap();
        job.refresh().await.unwrap();
        client.list_quotas().try_collect_all().await.unwrap();

        let contexts = backend.contexts();
        assert_eq!(contexts.len(), 3);
        for ctx in contexts {
            assert_eq!(ctx.access_token.secret(), "token");
            assert_eq!(ctx.diagnostic_id.as_str(), "OptionAppId-EnvVarAppId");
        }
    }

    #[tokio::test]
    async fn test_submit_embeds_location_verbatim() {
        let backend = Arc::new(InMemoryJobBackend::new(10));
        let client = client_with(backend);

        let job = client
            .submit(location("a"), "a", details().with_name("run"))
            .await
            .unwrap();

        assert_eq!(job.id().as_str(), "a");
        assert_eq!(job.status(), &JobStatus::Waiting);
        assert_eq!(job.details().container_uri, "https://store/job-a");
        assert_eq!(job.details().input_data_uri, "https://store/job-a/inputData");
        assert!(job.details().creation_time.is_some());
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_id_before_network() {
        let backend = Arc::new(InMemoryJobBackend::new(10));
        let client = client_with(backend.clone());

        let err = client.submit(location("x"), "", details()).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
        assert_eq!(backend.calls().create, 0);
    }

    #[tokio::test]
    async fn test_submit_surfaces_server_collision() {
        let backend = Arc::new(InMemoryJobBackend::new(10));
        let client = client_with(backend);

        assert_ok!(client.submit(location("a"), "a", details()).await);
        let err = client.submit(location("a"), "a", details()).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_get_unknown_job_is_not_found() {
        let client = client_with(Arc::new(InMemoryJobBackend::new(10)));
        let err = client.get("missing").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_succeeded_job_conflicts() {
        let backend = Arc::new(InMemoryJobBackend::new(10));
        let client = client_with(backend.clone());
        client.submit(location("a"), "a", details()).await.unwrap();
        backend.set_status(&JobId::new("a"), JobStatus::Succeeded);

        let mut job = client.get("a").await.unwrap();
        assert_eq!(job.status(), &JobStatus::Succeeded);

        let err = client.cancel(&mut job).await.unwrap_err();
        assert!(matches!(err, ClientError::Conflict(_)));
        assert_eq!(job.status(), &JobStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_list_quotas_two_pages() {
        let backend = Arc::new(
            InMemoryJobBackend::new(2).with_quotas(vec![quota("a"), quota("b"), quota("c")]),
        );
        let client = client_with(backend.clone());

        let mut lister = client.list_quotas();
        let first = lister.try_next().await.unwrap().unwrap();
        assert_eq!(first.dimension, "a");
        assert_eq!(backend.calls().list_quotas, 1);

        let rest = lister.try_collect_all().await.unwrap();
        let dims: Vec<_> = rest.iter().map(|q| q.dimension.as_str()).collect();
        assert_eq!(dims, vec!["b", "c"]);
        assert_eq!(backend.calls().list_quotas, 2);
    }

    #[tokio::test]
    async fn test_list_jobs_applies_filter_and_yields_handles() {
        let backend = Arc::new(InMemoryJobBackend::new(1));
        let client = client_with(backend.clone());
        for id in ["a", "b", "c"] {
            client.submit(location(id), id, details()).await.unwrap();
        }
        backend.set_status(&JobId::new("b"), JobStatus::Succeeded);

        let jobs = client
            .list_jobs(JobFilter::default().with_status(JobStatus::Waiting))
            .try_collect_all()
            .await
            .unwrap();
        let ids: Vec<_> = jobs.iter().map(|j| j.id().as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        // Listed handles are live
        let mut first = client.list_jobs(JobFilter::default()).take(1).await.unwrap();
        assert_ok!(first[0].refresh().await);
    }

    #[tokio::test]
    async fn test_list_provider_status_empty() {
        let client = client_with(Arc::new(InMemoryJobBackend::new(2)));
        let mut lister = client.list_provider_status();
        assert!(lister.try_next().await.unwrap().is_none());
        assert_eq!(lister.pages_fetched(), 1);
    }

    #[tokio::test]
    async fn test_submit_problem_compresses_and_uploads() {
        let backend = Arc::new(InMemoryJobBackend::new(10));
        let store = Arc::new(InMemoryBlobStore::new());
        let client = JobClient::builder(workspace(), backend, Arc::new(StaticTokenProvider::new("t")))
            .id_provider(Arc::new(SequentialIdProvider::new("job")))
            .uploader(store.clone())
            .build();

        let payload = br#"{"cost_function":{"version":"1.0","type":"ising","terms":[{"c":1,"ids":[0,1]}]}}"#;
        let job = client.submit_problem(payload, details()).await.unwrap();

        assert_eq!(job.id().as_str(), "job-1");
        assert_eq!(job.details().container_uri, "memory://job-job-1");
        assert_eq!(job.details().input_data_uri, "memory://job-job-1/inputData");

        let uploads = store.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].content_encoding.as_deref(), Some("gzip"));
        assert_eq!(payload::decompress(&uploads[0].data).unwrap(), payload.to_vec());
    }

    #[tokio::test]
    async fn test_submit_problem_without_uploader_is_not_configured() {
        let client = client_with(Arc::new(InMemoryJobBackend::new(10)));
        let err = assert_err!(client.submit_problem(b"{}", details()).await);
        assert!(err.is_not_configured());
    }

    #[test]
    fn test_page_map_keeps_cursor() {
        let page = Page::new(vec![1, 2], Some(crate::domain::PageCursor::new("n")));
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.next.unwrap().as_str(), "n");
    }
}
