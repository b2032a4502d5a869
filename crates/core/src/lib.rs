// Quasar Core - Domain Logic, Ports & Job Lifecycle
// NO transport dependencies: HTTP lives in quasar-sdk

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{ClientError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
