//! HTTP delivery with bounded retries.

use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::thread;
use std::time::Duration;
use thiserror::Error;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How many times to try a request and how long to wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    /// Per-attempt request timeout
    pub timeout: Duration,
    /// Pause between failed attempts
    pub delay: Duration,
}

impl RetryPolicy {
    /// Status notifications: 5 attempts, 30s each.
    pub const NOTIFICATION: RetryPolicy = RetryPolicy {
        attempts: 5,
        timeout: Duration::from_secs(30),
        delay: Duration::from_secs(1),
    };

    /// Heartbeat pings: 5 attempts, 10s each.
    pub const HEARTBEAT: RetryPolicy = RetryPolicy {
        attempts: 5,
        timeout: Duration::from_secs(10),
        delay: Duration::from_secs(1),
    };
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to create HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("maximum attempts ({attempts}) exceeded for {url}, last error: {last}")]
    Exhausted {
        attempts: u32,
        url: String,
        last: String,
    },

    #[error("authentication required by {url}")]
    Unauthorized { url: String },

    /// Some targets failed. `statuses` keeps what the others answered.
    #[error("{}", join_errors(.errors))]
    Combined {
        errors: Vec<DeliveryError>,
        statuses: String,
    },
}

fn join_errors(errors: &[DeliveryError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Blocking HTTP sender applying a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct Delivery {
    client: Client,
    policy: RetryPolicy,
}

impl Delivery {
    pub fn new(policy: RetryPolicy) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(policy.timeout))
            .timeout(policy.timeout)
            .user_agent(concat!("haul/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DeliveryError::Build)?;
        Ok(Self { client, policy })
    }

    /// Send until a 2xx arrives or the attempts run out. The body is sent
    /// again on every attempt. Returns the final status line (`"200 OK"`).
    pub fn send(
        &self,
        method: Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&[u8]>,
    ) -> Result<String, DeliveryError> {
        let attempts = self.policy.attempts.max(1);
        let mut last = String::from("no attempt made");
        let mut last_status = None;

        for attempt in 1..=attempts {
            tracing::debug!("Attempt {attempt}: {method} '{url}'");
            let mut request = self
                .client
                .request(method.clone(), url)
                .headers(headers.clone());
            if let Some(body) = body {
                request = request.body(body.to_vec());
            }

            match request.send() {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("Attempt {attempt}: {}", response.status());
                    return Ok(response.status().to_string());
                }
                Ok(response) => {
                    let status = response.status();
                    tracing::error!("Attempt {attempt}: unsuccessful response {status} from '{url}'");
                    last = format!("HTTP {status}");
                    last_status = Some(status);
                }
                Err(e) => {
                    tracing::error!("Attempt {attempt}: request to '{url}' failed: {e}");
                    last = e.to_string();
                    last_status = None;
                }
            }

            if attempt < attempts && !self.policy.delay.is_zero() {
                thread::sleep(self.policy.delay);
            }
        }

        if last_status == Some(StatusCode::UNAUTHORIZED) {
            return Err(DeliveryError::Unauthorized {
                url: url.to_string(),
            });
        }
        Err(DeliveryError::Exhausted {
            attempts,
            url: url.to_string(),
            last,
        })
    }
}
