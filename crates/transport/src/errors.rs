//! Errors produced while building and executing HTTP requests.

use std::time::Duration;

use chain::{ChainError, RetryPolicy};
use thiserror::Error;

/// Failures of the HTTP adapter, plus chaining configuration errors.
///
/// This is the `Error` type of [`crate::HttpDispatcher`], so every call made
/// through a stand-in bound to it fails with a [`TransportError`]. Chaining
/// errors arrive as [`TransportError::Chain`]; every other variant was
/// produced by the adapter itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The chaining core rejected the call before any request was built.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The transport configuration is invalid.
    #[error("Invalid transport configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration problem.
        message: String,
    },

    /// A request-line or body template could not be parsed.
    #[error("Invalid request template '{template}': {message}")]
    InvalidTemplate {
        /// The template source text.
        template: String,
        /// What is wrong with it.
        message: String,
    },

    /// No endpoint is registered for the dispatched operation.
    #[error("No endpoint is mapped for operation '{operation}'")]
    UnmappedOperation {
        /// Operation key (`Interface#operation`).
        operation: String,
    },

    /// The merged argument vector does not match the endpoint's parameters.
    #[error("Endpoint for '{operation}' binds {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Operation key (`Interface#operation`).
        operation: String,
        /// Number of parameters the endpoint declares.
        expected: usize,
        /// Length of the merged argument vector.
        actual: usize,
    },

    /// A path or body variable has no value.
    #[error("Template variable '{name}' has no value")]
    UnresolvedVariable {
        /// The variable name.
        name: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("Request timed out: {message}")]
    Timeout {
        /// Underlying client error text.
        message: String,
    },

    /// The connection to the server could not be established.
    #[error("Connection failed: {message}")]
    Connect {
        /// Underlying client error text.
        message: String,
    },

    /// Any other client-side failure while sending the request.
    #[error("Request failed: {message}")]
    Request {
        /// Underlying client error text.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("Server responded with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
        /// Delay requested by a `Retry-After` header (seconds form only).
        retry_after: Option<Duration>,
    },

    /// The response body could not be read or decoded.
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Underlying decoder error text.
        message: String,
    },
}

impl TransportError {
    /// Whether re-running the call may succeed.
    ///
    /// Timeouts, connection failures, `429 Too Many Requests`, and `5xx`
    /// responses are retryable; everything else is not.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::Timeout { .. } | Self::Connect { .. } => RetryPolicy::Retryable { after: None },
            Self::Status {
                status,
                retry_after,
                ..
            } if *status == 429 || *status >= 500 => RetryPolicy::Retryable {
                after: *retry_after,
            },
            _ => RetryPolicy::NonRetryable,
        }
    }

    /// The HTTP status, for [`TransportError::Status`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` for a `404 Not Found` response.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Renders an error followed by each of its sources, separated by `": "`.
pub(crate) fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // Some clients repeat the cause in their own message.
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = describe(&err);
        if err.is_timeout() {
            Self::Timeout { message }
        } else if err.is_connect() {
            Self::Connect { message }
        } else {
            Self::Request { message }
        }
    }
}
