//! Quasar SDK - HTTP client for a remote compute workspace
//!
//! Wires the `quasar-core` job client to the workspace REST API.
//!
//! # Example
//!
//! ```no_run
//! use quasar_sdk::{connect, ClientConfig, JobDetails, JobFilter, PayloadLocation};
//! use quasar_sdk::CancellationToken;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = connect(ClientConfig::from_env()?.with_app_id("my-tool"))?;
//!
//!     let details = JobDetails::new("microsoft.paralleltempering.cpu", "Microsoft", "microsoft.qio.v2", "microsoft.qio-results.v2");
//!     let location = PayloadLocation::new("https://store/container", "https://store/container/inputData");
//!     let mut job = client.submit(location, "5c6e1c0a-job", details).await?;
//!
//!     let status = job
//!         .wait_until_terminal(Some(Duration::from_secs(300)), &CancellationToken::never())
//!         .await?;
//!     println!("Job {} finished: {}", job.id(), status);
//!
//!     let recent = client.list_jobs(JobFilter::default()).take(10).await?;
//!     println!("{} jobs listed", recent.len());
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::{user_agent, workspace_url, HttpJobBackend, API_VERSION};
pub use config::{
    ClientConfig, ENV_ACCESS_TOKEN, ENV_ENDPOINT, ENV_LOCATION, ENV_RESOURCE_GROUP,
    ENV_SUBSCRIPTION_ID, ENV_WORKSPACE_NAME,
};
pub use error::{status_error, transport_error};

pub use quasar_core::application::{
    cancellation_channel, CancellationSource, CancellationToken, CloudJob, JobClient,
    PagedLister, PollPolicy,
};
pub use quasar_core::domain::{
    DiagnosticIdentifier, JobDetails, JobFilter, JobId, JobStatus, PayloadLocation,
    ProviderStatus, Quota, WorkspaceContext,
};
pub use quasar_core::port::{StaticTokenProvider, TokenProvider};
pub use quasar_core::{ClientError, Result};

use std::sync::Arc;

/// Build a [`JobClient`] talking HTTP, using the configured access token
///
/// # Errors
/// - `ClientError::NotConfigured` if no access token is configured
/// - `ClientError::InvalidArgument` if the application id is too long or the
///   endpoint is not an http(s) URL
pub fn connect(config: ClientConfig) -> Result<JobClient> {
    let token = config.access_token.clone().ok_or_else(|| {
        ClientError::NotConfigured(format!("no access token ({} unset)", ENV_ACCESS_TOKEN))
    })?;
    connect_with_credential(config, Arc::new(StaticTokenProvider::new(token)))
}

/// Build a [`JobClient`] talking HTTP with an external credential
pub fn connect_with_credential(
    config: ClientConfig,
    credential: Arc<dyn TokenProvider>,
) -> Result<JobClient> {
    let backend = HttpJobBackend::new(&config.workspace, &config.endpoint())?;

    let mut builder = JobClient::builder(config.workspace, Arc::new(backend), credential)
        .env_app_id(config.env_app_id);
    if let Some(app_id) = config.app_id {
        builder = builder.app_id(app_id)?;
    }
    Ok(builder.build())
}
