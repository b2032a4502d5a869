// Application Layer - Job lifecycle use cases

pub mod cancellation;
pub mod client;
pub mod constants;
pub mod job_handle;
pub mod listing;
pub mod paging;
pub mod payload;
pub mod polling;
pub mod session;

// Re-exports
pub use cancellation::{cancellation_channel, CancellationSource, CancellationToken};
pub use client::{JobClient, JobClientBuilder};
pub use job_handle::CloudJob;
pub use paging::{PageSource, PagedLister};
pub use polling::PollPolicy;
pub use session::WorkspaceSession;
