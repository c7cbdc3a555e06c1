use anyhow::{Context, Result};
use log::{debug, warn};
use std::fmt;
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};

use super::payload::{SubmissionPayload, SubmissionReceipt};
use crate::config::ApiConfig;
use crate::evaluation::Evaluation;

/// Failure of a single submission attempt.
#[derive(Debug)]
pub enum SubmitError {
    /// The request never got a response (DNS, connect, timeout).
    Transport(String),
    /// Token missing, invalid or lacking permission.
    Auth(u16),
    /// The server refused the evaluation; resending will not help.
    Rejected(u16, String),
    /// Server-side failure worth retrying.
    Server(u16, String),
}

impl SubmitError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::Transport(_) | SubmitError::Server(..))
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = body.trim().chars().take(200).collect::<String>();
        match status {
            401 | 403 => SubmitError::Auth(status),
            500..=599 => SubmitError::Server(status, detail),
            _ => SubmitError::Rejected(status, detail),
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Transport(msg) => {
                write!(f, "Could not reach the submission server: {}", msg)
            }
            SubmitError::Auth(status) => write!(
                f,
                "Authentication failed (HTTP {}). Your API token may be invalid or expired.",
                status
            ),
            SubmitError::Rejected(status, detail) => {
                write!(f, "Submission rejected (HTTP {})", status)?;
                if !detail.is_empty() {
                    write!(f, ": {}", detail)?;
                }
                Ok(())
            }
            SubmitError::Server(status, detail) => {
                write!(f, "Submission server error (HTTP {})", status)?;
                if !detail.is_empty() {
                    write!(f, ": {}", detail)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SubmitError {}

/// Total tries per submission, the first one included
pub const SUBMIT_ATTEMPTS: usize = 3;

/// Delays between tries: 100ms, then doubling, capped at 5s.
fn retry_delays() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(50)
        .max_delay(Duration::from_secs(5))
        .take(SUBMIT_ATTEMPTS - 1)
}

/// Create an HTTP client configured for the submission endpoint
pub fn create_client(api: &ApiConfig) -> Result<reqwest::Client> {
    // Err only means a provider is already installed
    let _ = rustls::crypto::ring::default_provider().install_default();

    reqwest::Client::builder()
        .timeout(api.timeout())
        .user_agent(concat!("inspect-score/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

pub fn submission_url(api: &ApiConfig) -> String {
    format!("{}/evaluations", api.base_url.trim_end_matches('/'))
}

async fn send_once(
    client: &reqwest::Client,
    url: &str,
    token: &str,
    payload: &SubmissionPayload<'_>,
) -> Result<SubmissionReceipt, SubmitError> {
    let response = client
        .post(url)
        .bearer_auth(token)
        .json(payload)
        .send()
        .await
        .map_err(|e| SubmitError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| SubmitError::Transport(e.to_string()))?;

    if status.is_success() {
        Ok(SubmissionReceipt::from_body(&body))
    } else {
        let err = SubmitError::from_status(status.as_u16(), &body);
        if err.is_retryable() {
            warn!("Submission attempt failed: {}", err);
        }
        Err(err)
    }
}

/// POST a draft evaluation to `{base_url}/evaluations`.
///
/// Transport failures and 5xx responses are retried with exponential backoff
/// ([`SUBMIT_ATTEMPTS`] tries in all); other failures are returned immediately. The evaluation is
/// not modified; marking it submitted is up to the caller once this succeeds.
pub async fn submit_evaluation(
    client: &reqwest::Client,
    api: &ApiConfig,
    token: &str,
    evaluation: &Evaluation,
) -> Result<SubmissionReceipt> {
    if evaluation.is_submitted() {
        anyhow::bail!(
            "Evaluation for '{}' has already been submitted",
            evaluation.subject_id
        );
    }

    let url = submission_url(api);
    let payload = SubmissionPayload::new(evaluation);
    debug!(
        "Submitting {} evaluation for {} (total {}) to {}",
        payload.kind, evaluation.subject_id, payload.total, url
    );

    let receipt = RetryIf::spawn(
        retry_delays(),
        || async { send_once(client, &url, token, &payload).await },
        |e: &SubmitError| e.is_retryable(),
    )
    .await?;

    Ok(receipt)
}
