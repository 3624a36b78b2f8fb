//! Retry policy for registration requests
//!
//! The registry server is occasionally briefly unavailable (deploys, load
//! spikes), so registration calls are retried with exponential backoff.
//! Only transient faults are retried: request timeouts and `503 Service
//! Unavailable`. Anything else fails fast, because retrying a rejected
//! request would just repeat the rejection.

use std::time::Duration;

use thiserror::Error;

use crate::error::ClientError;

// ============================================================================
// Retry Policy Constants
// ============================================================================

/// Default number of retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default initial backoff between attempts, in milliseconds.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 15_000;

/// Default multiplier applied to the backoff after each retry.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// A failed registration attempt, classified for retry purposes
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Fault {
    /// The request timed out before the server answered
    #[error("request timed out")]
    Timeout,

    /// The server answered 503
    #[error("service unavailable")]
    ServiceUnavailable,

    /// The server rejected the request; retrying would repeat the rejection
    #[error("server rejected request ({status}): {message}")]
    Client { status: u16, message: String },

    /// Anything else (connection refused, malformed response, ...)
    #[error("{0}")]
    Other(String),
}

impl Fault {
    /// Whether a retry has any chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Fault::Timeout | Fault::ServiceUnavailable)
    }
}

impl From<Fault> for ClientError {
    fn from(fault: Fault) -> Self {
        match fault {
            Fault::Client { status, message } => {
                ClientError::rejected(format!("{} ({})", message, status))
            },
            other => ClientError::api(other.to_string()),
        }
    }
}

/// Exponential backoff retry policy
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Number of retries after the first failed attempt
    pub max_retries: u32,
    /// Backoff before the first retry, in milliseconds
    pub initial_backoff_ms: u64,
    /// Growth factor applied to the backoff after each retry
    pub multiplier: f64,
    /// Optional ceiling on the backoff; unset means uncapped
    pub max_backoff_ms: Option<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_backoff_ms: None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff_ms: u64, multiplier: f64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            multiplier,
            max_backoff_ms: None,
        }
    }

    /// Cap the backoff at `ceiling_ms` milliseconds.
    pub fn with_max_backoff_ms(mut self, ceiling_ms: u64) -> Self {
        self.max_backoff_ms = Some(ceiling_ms);
        self
    }

    /// Backoff before retry number `retry` (0-indexed).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let mut millis =
            (self.initial_backoff_ms as f64 * self.multiplier.powi(retry as i32)) as u64;
        if let Some(ceiling) = self.max_backoff_ms {
            millis = millis.min(ceiling);
        }
        Duration::from_millis(millis)
    }

    /// Run `op` until it succeeds, fails fatally, or retries are exhausted.
    ///
    /// `max_retries` counts retries after the first attempt, so the
    /// operation runs at most `max_retries + 1` times.
    pub async fn execute<T, F, Fut>(&self, mut op: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, Fault>>,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let fault = match op().await {
                Ok(value) => return Ok(value),
                Err(fault) => fault,
            };

            if !fault.is_retryable() {
                tracing::error!(%fault, attempt, "Request failed with non-retryable fault");
                return Err(fault.into());
            }

            if attempt > self.max_retries {
                tracing::error!(%fault, attempt, "Retries exhausted");
                return Err(ClientError::RetriesExhausted {
                    attempts: attempt,
                    last: fault,
                });
            }

            let backoff = self.backoff_for(attempt - 1);
            tracing::warn!(
                %fault,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                "Transient fault, retrying after backoff"
            );
            tokio::time::sleep(backoff).await;
        }
    }
}
