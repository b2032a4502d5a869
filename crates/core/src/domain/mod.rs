// Domain Layer - Pure value types and validation

pub mod error;
pub mod identity;
pub mod job;
pub mod page;
pub mod resource;
pub mod workspace;

// Re-exports
pub use error::DomainError;
pub use identity::{validate_app_id, DiagnosticIdentifier, APP_ID_ENV_VAR, MAX_APP_ID_LEN};
pub use job::{ErrorData, JobDetails, JobFilter, JobId, JobStatus, PayloadLocation};
pub use page::{Page, PageCursor};
pub use resource::{ProviderStatus, Quota, TargetStatus};
pub use workspace::WorkspaceContext;
