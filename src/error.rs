use thiserror::Error;

/// Failures that abort an entire run.
///
/// Per-request failures never appear here: the gateway converts them into
/// counted [`crate::client::RequestOutcome`] values instead.
#[derive(Debug, Error)]
pub enum RunError {
    /// The shared HTTP client could not be built; no requests were issued.
    #[error("failed to set up HTTP client: {0}")]
    Setup(#[from] reqwest::Error),

    /// The run was cancelled from outside before the drain completed.
    /// In-flight requests were abandoned, not awaited.
    #[error("load test interrupted before completion")]
    Interrupted,
}
