//! Retrying JSON fetch.
//!
//! [`Fetcher::fetch`] never returns an error: once the retry budget is spent
//! it logs what it last saw and hands back `None`, and callers treat that as
//! "skip this unit of work".
//!
//! ## Retry policy
//!
//! - HTTP 429: wait `delay × (attempt + 1)` before the next attempt
//! - anything else (network, non-2xx, bad JSON): wait `delay`
//! - no wait after the final attempt
//!
//! Every call gets its own budget; nothing is shared between calls.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::FetchConfig;

/// Characters of a failed response body kept for diagnostics.
const BODY_PREVIEW_CHARS: usize = 500;

/// A single failed attempt.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}")]
    Status { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl FetchError {
    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// Truncated response body, when a response was received.
    pub fn body_preview(&self) -> Option<String> {
        match self {
            Self::Status { body, .. } => Some(body.chars().take(BODY_PREVIEW_CHARS).collect()),
            _ => None,
        }
    }
}

/// Transport that performs one GET and parses the body as JSON.
///
/// Implement this trait to script responses in tests.
#[async_trait]
pub trait JsonSource: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Production transport over `reqwest`.
///
/// Sends `accept: application/json` and, when configured, the
/// `x-api-key` header Sportradar authenticates with.
pub struct HttpJsonSource {
    http_client: reqwest::Client,
    api_key: Option<String>,
}

impl HttpJsonSource {
    pub fn new(api_key: Option<String>) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
        })
    }
}

#[async_trait]
impl JsonSource for HttpJsonSource {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let mut request = self
            .http_client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_count: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_count: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            retry_count: config.retry_count,
            delay: config.retry_delay(),
        }
    }
}

impl RetryPolicy {
    /// Wait before the attempt following `attempt` (zero-based) failed with `error`.
    pub fn wait_after(&self, error: &FetchError, attempt: u32) -> Duration {
        if error.is_rate_limited() {
            self.delay * (attempt + 1)
        } else {
            self.delay
        }
    }
}

/// Retry wrapper around a [`JsonSource`].
pub struct Fetcher<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: JsonSource> Fetcher<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    /// GET `url` as JSON, retrying per the policy. `None` means "no data".
    pub async fn fetch(&self, url: &str) -> Option<Value> {
        let attempts = self.policy.retry_count;
        tracing::debug!("Fetching {}", url);

        for attempt in 0..attempts {
            let error = match self.source.get_json(url).await {
                Ok(value) => {
                    tracing::debug!("Fetched {}", url);
                    return Some(value);
                }
                Err(e) => e,
            };

            tracing::warn!(
                "Attempt {}/{} failed for {} (status: {}): {}",
                attempt + 1,
                attempts,
                url,
                status_label(&error),
                error
            );

            if attempt + 1 == attempts {
                report_exhausted(url, &error);
                return None;
            }

            let wait = self.policy.wait_after(&error, attempt);
            if error.is_rate_limited() {
                tracing::info!("Rate limited, waiting {:?} before retrying", wait);
            }
            tokio::time::sleep(wait).await;
        }

        None
    }
}

fn status_label(error: &FetchError) -> String {
    error
        .status()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn report_exhausted(url: &str, error: &FetchError) {
    match error.body_preview() {
        Some(body) => tracing::error!(
            "Giving up on {} (status: {}). Response body: {}...",
            url,
            status_label(error),
            body
        ),
        None => tracing::error!("Giving up on {}: {}", url, error),
    }
}

/// Scripted transport for tests.
#[cfg(test)]
pub mod mocks {
    use std::collections::{HashMap, VecDeque};

    use parking_lot::Mutex;

    use super::*;

    /// Returns queued responses per URL; the last queued response repeats.
    ///
    /// URLs with nothing queued answer 404.
    #[derive(Default)]
    pub struct ScriptedSource {
        responses: Mutex<HashMap<String, VecDeque<Result<Value, FetchError>>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response for `url`.
        pub fn respond(&self, url: impl Into<String>, response: Result<Value, FetchError>) {
            self.responses
                .lock()
                .entry(url.into())
                .or_default()
                .push_back(response);
        }

        /// Number of GETs issued for `url`.
        pub fn calls_to(&self, url: &str) -> usize {
            self.calls.lock().iter().filter(|u| *u == url).count()
        }

        pub fn total_calls(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl JsonSource for ScriptedSource {
        async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
            self.calls.lock().push(url.to_string());
            let mut responses = self.responses.lock();
            match responses.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(not_found),
                Some(queue) => queue.front().cloned().unwrap_or_else(not_found),
                None => not_found(),
            }
        }
    }

    fn not_found() -> Result<Value, FetchError> {
        Err(FetchError::Status {
            status: 404,
            body: "not scripted".to_string(),
        })
    }

    pub fn rate_limited() -> FetchError {
        FetchError::Status {
            status: 429,
            body: "Too Many Requests".to_string(),
        }
    }

    pub fn server_error() -> FetchError {
        FetchError::Status {
            status: 500,
            body: "x".repeat(2000),
        }
    }
}
