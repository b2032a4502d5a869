// Port Layer - Interfaces for external collaborators

pub mod blob_uploader; // storage
pub mod id_provider; // For deterministic testing
pub mod job_backend; // transport
pub mod token_provider; // credential

// Re-exports
pub use blob_uploader::{BlobUpload, BlobUploader};
pub use id_provider::{IdProvider, UuidProvider};
pub use job_backend::{JobBackend, RequestContext};
pub use token_provider::{AccessToken, StaticTokenProvider, TokenProvider};
