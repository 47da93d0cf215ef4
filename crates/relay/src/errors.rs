//! Error and retry-policy types for the notification domain.
//!
//! [`RelayError`] covers every condition that ends an invocation early.
//! [`RetryPolicy`] is a cross-cutting concern: the host retries an invocation
//! exactly when the error that ended it reports [`RetryPolicy::Retryable`],
//! so every error that can reach the top level must produce a policy.
//!
//! Enrichment failures are the deliberate exception: they never reach the
//! top level because the enricher swallows them (see [`crate::enrich`]).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// Returned by error types to let the composition root decide whether to
/// surface a failure to the host (which re-runs the whole invocation) or to
/// acknowledge the event and drop it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The invocation may be retried.
    ///
    /// `after` optionally specifies the minimum delay before retrying.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the host's own back-off schedule.
        after: Option<Duration>,
    },
    /// The invocation must not be retried; the event is acknowledged and
    /// dropped.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Invocation-level errors
// ---------------------------------------------------------------------------

/// Errors that end a handler invocation.
///
/// The variants split along the retry boundary: event-shape and configuration
/// problems are permanent (retrying replays the same bad input), while
/// delivery and secret-resolution failures are transient.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum RelayError {
    /// The envelope's source / detail-type pair matches no known handler.
    ///
    /// Signals "ack and drop": the event is not for us and never will be.
    #[error("unrecognized event (source {event_source:?}, detail-type {detail_type:?})")]
    UnrecognizedEvent {
        /// The envelope's `source` field, if present.
        event_source: Option<String>,
        /// The envelope's `detail-type` field, if present.
        detail_type: Option<String>,
    },

    /// The envelope matched a known handler but its detail payload failed
    /// validation.
    #[error("malformed {kind} event detail: {message}")]
    MalformedEvent {
        /// Which payload shape was expected (`"build"`, `"pull request"`, ...).
        kind: String,
        /// What the deserialiser rejected.
        message: String,
    },

    /// A required configuration input is missing or invalid.
    ///
    /// Produced at wiring time; a handler never starts its sink call with an
    /// incomplete configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A sink call failed.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The webhook URL could not be resolved.
    #[error(transparent)]
    Secret(#[from] SecretError),
}

impl RelayError {
    /// The retry decision this error carries to the host.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            RelayError::UnrecognizedEvent { .. }
            | RelayError::MalformedEvent { .. }
            | RelayError::Configuration { .. } => RetryPolicy::NonRetryable,
            RelayError::Delivery(error) => error.retry_policy(),
            RelayError::Secret(error) => error.retry_policy(),
        }
    }

    /// Convenience constructor for [`RelayError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        RelayError::Configuration {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Component errors
// ---------------------------------------------------------------------------

/// A sink call failed.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum DeliveryError {
    /// The sink's API call failed or was rejected.
    #[error("{sink} delivery failed: {message}")]
    Api {
        /// Which sink failed (`"ses"`, `"codecommit"`, `"codebuild"`, `"chat"`).
        sink: String,
        /// The underlying API error, rendered.
        message: String,
    },

    /// The chat webhook endpoint answered with a server-side failure status.
    ///
    /// Client-error statuses (400–499) are NOT delivery errors: the adapter
    /// reports them as a dropped delivery because retrying a malformed
    /// request cannot succeed.
    #[error("webhook endpoint returned server error status {status}")]
    Server {
        /// The HTTP status code, always >= 500.
        status: u16,
    },
}

impl DeliveryError {
    /// Both variants are transient: the host should retry the invocation.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::Retryable { after: None }
    }
}

/// A best-effort log-tail fetch failed.
///
/// Never escapes the enricher; carried only so adapters have a typed error
/// to return and the enricher has something to log.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum EnrichmentError {
    /// The log service call failed.
    #[error("log tail fetch failed: {message}")]
    Fetch {
        /// The underlying API error, rendered.
        message: String,
    },
}

/// The chat webhook URL could not be resolved.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum SecretError {
    /// Neither an encrypted webhook blob nor a parameter name is configured.
    #[error("no webhook secret is configured")]
    Unconfigured,

    /// Decryption or parameter retrieval failed.
    #[error("webhook secret resolution failed: {message}")]
    Resolution {
        /// The underlying failure, rendered.
        message: String,
    },
}

impl SecretError {
    /// Missing configuration is permanent; a failed decrypt or parameter
    /// fetch is transient.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            SecretError::Unconfigured => RetryPolicy::NonRetryable,
            SecretError::Resolution { .. } => RetryPolicy::Retryable { after: None },
        }
    }
}
