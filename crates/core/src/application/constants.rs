// Client constants (no magic values)
use std::time::Duration;

/// First poll interval while waiting for a job (200ms)
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Upper bound for the poll interval after backoff (30s)
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Poll interval growth per attempt
pub const POLL_BACKOFF_FACTOR: f64 = 1.5;

/// Floor for any poll interval, waiting never busy-spins
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Container name prefix for uploaded payloads (`job-<id>`)
pub const PAYLOAD_CONTAINER_PREFIX: &str = "job-";

/// Blob name of the uploaded problem payload
pub const PAYLOAD_BLOB_NAME: &str = "inputData";

/// Content type of uploaded problem payloads
pub const PAYLOAD_CONTENT_TYPE: &str = "application/json";

/// Content encoding of uploaded problem payloads
pub const PAYLOAD_CONTENT_ENCODING: &str = "gzip";
