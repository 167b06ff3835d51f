use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tokio::time::Instant;

use super::models::*;
use super::retry::RetryLoop;
use crate::error::{PostError, Result};
use crate::logger::Logger;

pub struct PostClient {
    client: Client,
    logger: Logger,
}

impl PostClient {
    pub fn new(request_timeout: Duration, logger: Logger) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(PostError::Transport)?;

        Ok(Self { client, logger })
    }

    /// Issues the POST once. Only transport failures are errors here; any
    /// HTTP status comes back as an [`ApiResponse`].
    pub async fn send(&self, descriptor: &RequestDescriptor) -> Result<ApiResponse> {
        let headers = build_headers(descriptor)?;

        self.logger.debug(format_args!(
            "==> POST {}\nHEADERS: {:?}\nBODY: {}",
            descriptor.url(),
            descriptor.headers(),
            serde_json::to_string(descriptor.body())?
        ));

        let started = Instant::now();
        let response = self
            .client
            .post(descriptor.url())
            .headers(headers)
            .json(descriptor.body())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        let elapsed = started.elapsed();

        let (envelope, parse_error) = ResponseEnvelope::from_body(&body);
        if let Some(e) = parse_error {
            self.logger
                .debug(format_args!("response body is not an envelope: {}", e));
        }

        self.logger.debug(format_args!(
            "<== {} ({:?})\nBODY: {}",
            status, elapsed, body
        ));

        Ok(ApiResponse {
            status,
            content_type,
            body,
            envelope,
            elapsed,
        })
    }

    /// One classified attempt: 5xx becomes a retryable error, 4xx a terminal one.
    pub async fn attempt(&self, descriptor: &RequestDescriptor, attempt: u32) -> Result<ApiResponse> {
        let response = self.send(descriptor).await?;

        self.logger.debug(format_args!(
            "Trace Information: attempt={} status={} total_time={:?}",
            attempt, response.status, response.elapsed
        ));

        classify(response)
    }

    /// Sends the request through `retry`, returning the first non-retryable outcome.
    pub async fn execute(&self, descriptor: &RequestDescriptor, retry: &RetryLoop) -> Result<ApiResponse> {
        self.logger.debug(format_args!(
            "cookies: [{}]",
            descriptor
                .cookies()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ));

        retry.run(|attempt| self.attempt(descriptor, attempt)).await
    }

    fn transport_error(&self, e: reqwest::Error) -> PostError {
        self.logger.error(format_args!("Request failed: {}", e));
        PostError::Transport(e)
    }
}

pub fn classify(response: ApiResponse) -> Result<ApiResponse> {
    let status = response.status;

    if status.is_server_error() {
        Err(PostError::Server {
            status,
            body: response.body,
        })
    } else if status.is_client_error() {
        Err(PostError::Client {
            status,
            body: response.body,
        })
    } else {
        Ok(response)
    }
}

fn build_headers(descriptor: &RequestDescriptor) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (key, value) in descriptor.headers() {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| PostError::InvalidInput(format!("header name '{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| PostError::InvalidInput(format!("header '{}' value: {}", key, e)))?;
        headers.insert(name, value);
    }

    if let Some(cookie) = descriptor.cookie_header() {
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| PostError::InvalidInput(format!("cookie value: {}", e)))?;
        headers.insert(COOKIE, value);
    }

    Ok(headers)
}
