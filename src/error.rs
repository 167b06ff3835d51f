use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server error: {status}")]
    Server { status: StatusCode, body: String },

    #[error("client error: {status}")]
    Client { status: StatusCode, body: String },

    #[error("retry policy exhausted after {attempts} attempts: {source}")]
    PolicyExhausted {
        attempts: u32,
        #[source]
        source: Box<PostError>,
    },

    #[error("context deadline exceeded after {attempts} attempts ({deadline:?})")]
    DeadlineExceeded { attempts: u32, deadline: Duration },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PostError {
    /// Transport failures and 5xx responses get another attempt; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PostError::Transport(_) | PostError::Server { .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            PostError::Server { status, .. } | PostError::Client { status, .. } => Some(*status),
            PostError::Transport(e) => e.status(),
            PostError::PolicyExhausted { source, .. } => source.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PostError>;
