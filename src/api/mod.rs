pub mod backoff;
pub mod client;
pub mod models;
pub mod retry;

pub use client::PostClient;
pub use retry::RetryLoop;
