// Page sources bound to the workspace listing endpoints

use super::job_handle::CloudJob;
use super::paging::PageSource;
use super::session::WorkspaceSession;
use crate::domain::{JobFilter, Page, PageCursor, ProviderStatus, Quota};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub struct JobPages {
    session: Arc<WorkspaceSession>,
    filter: JobFilter,
}

impl JobPages {
    pub fn new(session: Arc<WorkspaceSession>, filter: JobFilter) -> Self {
        Self { session, filter }
    }
}

#[async_trait]
impl PageSource for JobPages {
    type Item = CloudJob;

    async fn fetch(&self, cursor: Option<&PageCursor>) -> Result<Page<CloudJob>> {
        let ctx = self.session.request_context().await?;
        let page = self
            .session
            .backend()
            .list_jobs(&ctx, &self.filter, cursor)
            .await?;
        Ok(page.map(|details| CloudJob::new(Arc::clone(&self.session), details)))
    }
}

pub struct QuotaPages {
    session: Arc<WorkspaceSession>,
}

impl QuotaPages {
    pub fn new(session: Arc<WorkspaceSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl PageSource for QuotaPages {
    type Item = Quota;

    async fn fetch(&self, cursor: Option<&PageCursor>) -> Result<Page<Quota>> {
        let ctx = self.session.request_context().await?;
        self.session.backend().list_quotas(&ctx, cursor).await
    }
}

pub struct ProviderStatusPages {
    session: Arc<WorkspaceSession>,
}

impl ProviderStatusPages {
    pub fn new(session: Arc<WorkspaceSession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl PageSource for ProviderStatusPages {
    type Item = ProviderStatus;

    async fn fetch(&self, cursor: Option<&PageCursor>) -> Result<Page<ProviderStatus>> {
        let ctx = self.session.request_context().await?;
        self.session.backend().list_provider_status(&ctx, cursor).await
    }
}
