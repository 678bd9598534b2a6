use std::time::Duration;

use log::{error, info};
use reqwest::Client;

/// Settings for the shared HTTP client used by every request in a run.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
}

/// Builds the one pooled client a run shares across all of its requests.
/// Creating a client per request would defeat connection reuse, so this
/// is called exactly once, at run setup.
pub fn build_client(config: &HttpClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
}

/// The result of one completed request attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// HTTP status in [200, 300).
    Success(u16),
    /// Any other HTTP status. Not an error: a counted outcome.
    Failure(u16),
    /// The request never produced a status: connect, DNS, timeout, TLS.
    Error(String),
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestOutcome::Success(_))
    }
}

fn classify_status(status: u16) -> RequestOutcome {
    if (200..300).contains(&status) {
        RequestOutcome::Success(status)
    } else {
        RequestOutcome::Failure(status)
    }
}

/// Issues one outbound request. The controller only ever talks to this
/// seam, so tests can drive it with fakes instead of a live server.
#[async_trait::async_trait]
pub trait RequestGateway: Send + Sync {
    async fn issue(&self) -> RequestOutcome;
}

/// Gateway backed by a shared `reqwest::Client` and a fixed target URL.
pub struct HttpGateway {
    client: Client,
    url: String,
}

impl HttpGateway {
    pub fn new(client: Client, url: String) -> Self {
        HttpGateway { client, url }
    }
}

#[async_trait::async_trait]
impl RequestGateway for HttpGateway {
    /// One GET against the target. Never panics and never propagates:
    /// transport failures come back as `RequestOutcome::Error` so a bad
    /// request can never take down the controller loop.
    async fn issue(&self) -> RequestOutcome {
        match self.client.get(&self.url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let outcome = classify_status(status);
                match outcome {
                    RequestOutcome::Success(_) => {
                        info!("Request completed with status {}", status)
                    }
                    _ => error!("'{}' responded with HTTP status {}", self.url, status),
                }
                outcome
            }
            Err(e) => {
                error!("Failed to reach '{}': {}", self.url, e);
                RequestOutcome::Error(e.to_string())
            }
        }
    }
}
