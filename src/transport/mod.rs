//! Throttled HTTP transport with bounded retry
//!
//! Wraps a [`reqwest::Client`] with the politeness and resilience rules every
//! outbound request must follow:
//! - per-host minimum spacing between attempts ([`HostThrottle`])
//! - a randomized browser User-Agent per attempt
//! - bounded retry with a fixed backoff on transient failures
//! - immediate failure on responses that will never succeed

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::USER_AGENT;
use reqwest::{RequestBuilder, Response, StatusCode};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::{CONNECT_TIMEOUT, READ_TIMEOUT};

pub mod throttle;

pub use throttle::HostThrottle;

/// Browser identities rotated across attempts.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:124.0) Gecko/20100101 Firefox/124.0",
];

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a status that will never succeed on retry
    #[error("HTTP {status} {reason} for {url}")]
    FatalStatus {
        /// Response status code
        status: u16,
        /// Canonical status reason
        reason: String,
        /// Request URL
        url: String,
    },

    /// Every attempt failed with a transient error
    #[error("retries exhausted after {attempts} attempts, last failure: {last}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Status or error observed on the final attempt
        last: String,
    },

    /// The underlying HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// The request could not be built or replayed for a retry
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// HTTP client enforcing throttling, retry, and response classification.
///
/// Classification of each attempt:
/// - `200 OK` - success, the response is returned
/// - `404 Not Found` - fatal, fails immediately without retrying
/// - anything else, or a connection/timeout error - retryable after a fixed
///   backoff, up to the configured attempt budget
pub struct ThrottledClient {
    client: reqwest::Client,
    throttle: HostThrottle,
    max_retries: u32,
    backoff: Duration,
}

impl ThrottledClient {
    /// Create a client with the given per-host delay and attempt budget.
    ///
    /// The retry backoff defaults to the same duration as the delay.
    ///
    /// # Errors
    /// Returns [`TransportError::ClientBuild`] if the underlying client
    /// cannot be constructed.
    pub fn new(delay: Duration, max_retries: u32) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            throttle: HostThrottle::new(delay),
            max_retries: max_retries.max(1),
            backoff: delay,
        })
    }

    /// Override the retry backoff.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// The configured attempt budget.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Start building a GET request.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Start building a POST request.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.client.post(url)
    }

    /// Send a request, retrying transient failures.
    ///
    /// Each attempt waits on the per-host throttle, carries a freshly chosen
    /// User-Agent, and stamps the host clock whether or not it succeeds.
    ///
    /// # Errors
    /// [`TransportError::FatalStatus`] on a non-retryable response,
    /// [`TransportError::RetriesExhausted`] once the attempt budget is spent.
    pub async fn send(&self, request: RequestBuilder) -> TransportResult<Response> {
        let mut last_failure = String::from("no attempt made");

        for attempt in 1..=self.max_retries {
            let prepared = request
                .try_clone()
                .ok_or_else(|| {
                    TransportError::InvalidRequest("request body cannot be replayed".to_string())
                })?
                .header(USER_AGENT, self.pick_user_agent())
                .build()
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

            let url = prepared.url().clone();
            let host = url.host_str().unwrap_or_default().to_string();
            self.throttle.wait(&host).await;

            debug!(%url, attempt, max = self.max_retries, "sending request");

            match self.client.execute(prepared).await {
                Ok(response) => {
                    let status = response.status();
                    if status == StatusCode::OK {
                        return Ok(response);
                    }
                    if status == StatusCode::NOT_FOUND {
                        return Err(TransportError::FatalStatus {
                            status: status.as_u16(),
                            reason: status.canonical_reason().unwrap_or("unknown").to_string(),
                            url: url.to_string(),
                        });
                    }
                    last_failure = format!(
                        "HTTP {} {} for {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("unknown"),
                        url
                    );
                    warn!(
                        status = status.as_u16(),
                        attempt,
                        max = self.max_retries,
                        "retryable response"
                    );
                }
                Err(e) => {
                    last_failure = format!("{e} for {url}");
                    warn!(error = %e, attempt, max = self.max_retries, "request failed");
                }
            }

            if attempt < self.max_retries && !self.backoff.is_zero() {
                sleep(self.backoff).await;
            }
        }

        Err(TransportError::RetriesExhausted {
            attempts: self.max_retries,
            last: last_failure,
        })
    }

    fn pick_user_agent(&self) -> &'static str {
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }
}
