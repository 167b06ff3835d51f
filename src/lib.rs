// Library interface for resilient-post
// Exposes the building blocks so the binary and the integration tests share them

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logger;
pub mod utils;

// Re-export commonly used types
pub use api::{PostClient, RetryLoop};
pub use config::{BackoffConfig, Config};
pub use error::{PostError, Result};
pub use logger::{LogSink, Logger, MemorySink};
