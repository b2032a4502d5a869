// Storage Port
// Uploading is external; the client only hands over bytes and keeps the
// returned references.

use crate::domain::PayloadLocation;
use crate::error::Result;
use async_trait::async_trait;

/// A blob to upload
#[derive(Debug, Clone)]
pub struct BlobUpload {
    pub container: String,
    pub blob_name: String,
    pub content_type: String,
    pub content_encoding: Option<String>,
    pub data: Vec<u8>,
}

/// Storage collaborator
#[async_trait]
pub trait BlobUploader: Send + Sync {
    /// Upload a payload and return its container/input references
    async fn upload(&self, blob: BlobUpload) -> Result<PayloadLocation>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Keeps uploads in memory and fabricates `memory://` references
    #[derive(Default)]
    pub struct InMemoryBlobStore {
        uploads: Mutex<Vec<BlobUpload>>,
    }

    impl InMemoryBlobStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn uploads(&self) -> Vec<BlobUpload> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BlobUploader for InMemoryBlobStore {
        async fn upload(&self, blob: BlobUpload) -> Result<PayloadLocation> {
            let container_uri = format!("memory://{}", blob.container);
            let input_data_uri = format!("{}/{}", container_uri, blob.blob_name);
            self.uploads.lock().unwrap().push(blob);
            Ok(PayloadLocation::new(container_uri, input_data_uri))
        }
    }
}
