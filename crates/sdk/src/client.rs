//! HTTP implementation of the `JobBackend` port

use crate::error::{status_error, transport_error};
use crate::types::PageResponse;
use async_trait::async_trait;
use quasar_core::domain::{
    DiagnosticIdentifier, JobDetails, JobFilter, JobId, Page, PageCursor, ProviderStatus, Quota,
    WorkspaceContext,
};
use quasar_core::port::{JobBackend, RequestContext};
use quasar_core::{ClientError, Result};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// REST API version segment
pub const API_VERSION: &str = "v1.0";

const SDK_AGENT: &str = concat!("quasar-sdk/", env!("CARGO_PKG_VERSION"));

/// Workspace endpoint over HTTP
///
/// Every request carries `Authorization: Bearer <token>` and a `User-Agent`
/// prefixed with the client's diagnostic identifier.
pub struct HttpJobBackend {
    http: Client,
    base_url: Url,
}

impl HttpJobBackend {
    /// Create a backend for `workspace` behind `endpoint`
    /// (e.g., `https://westus.quantum.azure.com`)
    ///
    /// # Errors
    /// - `ClientError::InvalidArgument` if `endpoint` is not an http(s) URL
    pub fn new(workspace: &WorkspaceContext, endpoint: &str) -> Result<Self> {
        let base_url = workspace_url(endpoint, workspace)?;
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to create client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    fn request(&self, method: Method, url: Url, ctx: &RequestContext) -> RequestBuilder {
        debug!(%method, %url, "Workspace request");
        self.http
            .request(method, url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", ctx.access_token.secret()),
            )
            .header(USER_AGENT, user_agent(&ctx.diagnostic_id))
    }

    /// Base URL with `segments` appended, each one percent-encoded
    fn resource_url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Always a base URL: checked by `workspace_url`
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn job_url(&self, id: &JobId) -> Url {
        self.resource_url(&["jobs", id.as_str()])
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        collection: &str,
        query: &[(&'static str, String)],
        cursor: Option<&PageCursor>,
    ) -> Result<Page<T>> {
        // A cursor is the full next link, query included
        let request = match cursor {
            Some(next_link) => {
                let url = Url::parse(next_link.as_str()).map_err(|e| {
                    ClientError::InvalidArgument(format!("Invalid next link '{}': {}", next_link, e))
                })?;
                self.request(Method::GET, url, ctx)
            }
            None => self
                .request(Method::GET, self.resource_url(&[collection]), ctx)
                .query(query),
        };
        let response: PageResponse<T> = send_json(request).await?;
        Ok(Page::new(
            response.value,
            response.next_link.filter(|l| !l.is_empty()).map(PageCursor::new),
        ))
    }
}

/// `{endpoint}/v1.0/subscriptions/{sub}/resourceGroups/{rg}/workspaces/{name}`
///
/// Workspace names are percent-encoded as single path segments.
pub fn workspace_url(endpoint: &str, workspace: &WorkspaceContext) -> Result<Url> {
    let invalid = |reason: String| {
        ClientError::InvalidArgument(format!("Invalid endpoint '{}': {}", endpoint, reason))
    };

    let mut url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("not a base URL".to_string()))?
        .pop_if_empty()
        .extend([
            API_VERSION,
            "subscriptions",
            workspace.subscription_id.as_str(),
            "resourceGroups",
            workspace.resource_group.as_str(),
            "workspaces",
            workspace.name.as_str(),
        ]);
    Ok(url)
}

/// `<app-id> quasar-sdk/<version>`, app id omitted when empty
pub fn user_agent(diagnostic_id: &DiagnosticIdentifier) -> String {
    if diagnostic_id.is_empty() {
        SDK_AGENT.to_string()
    } else {
        format!("{} {}", diagnostic_id, SDK_AGENT)
    }
}

fn filter_query(filter: &JobFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(status) = &filter.status {
        query.push(("status", status.to_string()));
    }
    if let Some(target) = &filter.target {
        query.push(("target", target.clone()));
    }
    if let Some(provider_id) = &filter.provider_id {
        query.push(("providerId", provider_id.clone()));
    }
    if let Some(fragment) = &filter.name_contains {
        query.push(("name", fragment.clone()));
    }
    if let Some(after) = &filter.created_after {
        query.push(("createdAfter", after.to_rfc3339()));
    }
    query
}

async fn send_raw(request: RequestBuilder) -> Result<String> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        debug!(status = status.as_u16(), "Workspace request failed");
        return Err(status_error(status, &body));
    }
    Ok(body)
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let body = send_raw(request).await?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl JobBackend for HttpJobBackend {
    async fn create_job(&self, ctx: &RequestContext, details: &JobDetails) -> Result<JobDetails> {
        let request = self
            .request(Method::PUT, self.job_url(&details.id), ctx)
            .json(details);
        send_json(request).await
    }

    async fn get_job(&self, ctx: &RequestContext, id: &JobId) -> Result<JobDetails> {
        send_json(self.request(Method::GET, self.job_url(id), ctx)).await
    }

    async fn cancel_job(&self, ctx: &RequestContext, id: &JobId) -> Result<()> {
        send_raw(self.request(Method::DELETE, self.job_url(id), ctx)).await?;
        Ok(())
    }

    async fn list_jobs(
        &self,
        ctx: &RequestContext,
        filter: &JobFilter,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<JobDetails>> {
        self.fetch_page(ctx, "jobs", &filter_query(filter), cursor)
            .await
    }

    async fn list_quotas(
        &self,
        ctx: &RequestContext,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<Quota>> {
        self.fetch_page(ctx, "quotas", &[], cursor).await
    }

    async fn list_provider_status(
        &self,
        ctx: &RequestContext,
        cursor: Option<&PageCursor>,
    ) -> Result<Page<ProviderStatus>> {
        self.fetch_page(ctx, "providerStatus", &[], cursor).await
    }
}
