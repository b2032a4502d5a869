// Workspace session - immutable state shared by the client, its job handles
// and its listers

use crate::domain::{DiagnosticIdentifier, JobDetails, JobId, WorkspaceContext};
use crate::error::Result;
use crate::port::{JobBackend, RequestContext, TokenProvider};
use std::sync::Arc;

pub struct WorkspaceSession {
    workspace: WorkspaceContext,
    backend: Arc<dyn JobBackend>,
    credential: Arc<dyn TokenProvider>,
    diagnostic_id: DiagnosticIdentifier,
}

impl WorkspaceSession {
    pub fn new(
        workspace: WorkspaceContext,
        backend: Arc<dyn JobBackend>,
        credential: Arc<dyn TokenProvider>,
        diagnostic_id: DiagnosticIdentifier,
    ) -> Self {
        Self {
            workspace,
            backend,
            credential,
            diagnostic_id,
        }
    }

    pub fn workspace(&self) -> &WorkspaceContext {
        &self.workspace
    }

    pub fn diagnostic_id(&self) -> &DiagnosticIdentifier {
        &self.diagnostic_id
    }

    pub fn backend(&self) -> &dyn JobBackend {
        self.backend.as_ref()
    }

    /// Fresh token plus the fixed diagnostic identifier
    pub async fn request_context(&self) -> Result<RequestContext> {
        let access_token = self.credential.token().await?;
        Ok(RequestContext {
            access_token,
            diagnostic_id: self.diagnostic_id.clone(),
        })
    }

    pub async fn fetch_job(&self, id: &JobId) -> Result<JobDetails> {
        let ctx = self.request_context().await?;
        self.backend.get_job(&ctx, id).await
    }
}
