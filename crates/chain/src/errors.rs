//! Configuration error and retry-policy types for the chaining core.
//!
//! [`ChainError`] covers every failure the core itself can produce. All of them
//! are programming or configuration mistakes: an undeclared operation, a
//! contract that references an unregistered interface, a call with the wrong
//! number of arguments. Failures raised by a [`crate::Dispatcher`] are never
//! converted into a [`ChainError`]; they reach the caller unchanged.
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that participates
//! in retry decisions must be able to produce a [`RetryPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// The chaining core never retries. Dispatcher error types expose a
/// [`RetryPolicy`] so callers can decide whether to re-run a whole chain.
///
/// ## Rules
///
/// - `Retryable` errors: timeouts, connection failures, rate limiting,
///   server-side failures.
/// - `NonRetryable` errors: configuration errors, client errors, decode errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    ///
    /// `after` optionally specifies the minimum delay before retrying (e.g.
    /// derived from a `Retry-After` response header).
    Retryable {
        /// Minimum back-off before the next attempt. `None` means retry
        /// immediately or apply the caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

impl RetryPolicy {
    /// Returns `true` for [`RetryPolicy::Retryable`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

// ---------------------------------------------------------------------------
// Chaining errors
// ---------------------------------------------------------------------------

/// Configuration errors raised by the chaining core.
///
/// Every variant is fatal: it is reported at the point of invocation (or of
/// contract construction) and is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ChainError {
    /// The invoked operation is not declared on the stand-in's interface.
    #[error("Operation '{operation}' is not declared on interface '{interface}'")]
    UnknownOperation {
        /// Interface the stand-in is bound to.
        interface: String,
        /// Operation id that was invoked.
        operation: String,
    },

    /// An interface name is not registered in the contract.
    ///
    /// Produced when a fluent operation returns an interface the contract
    /// does not know, or when the root interface is missing.
    #[error("Interface '{name}' is not registered in the contract")]
    UnknownInterface {
        /// The unrecognised interface name.
        name: String,
    },

    /// A fluent operation was invoked through the terminal entry point, or
    /// the other way round.
    #[error("Operation '{operation}' is {actual}, not {expected}")]
    KindMismatch {
        /// Operation key (`Interface#operation`).
        operation: String,
        /// The kind the caller asked for.
        expected: String,
        /// The kind the operation is declared with.
        actual: String,
    },

    /// The number of call arguments differs from the declared parameters.
    #[error("Operation '{operation}' expects {expected} argument(s), got {actual}")]
    ArityMismatch {
        /// Operation key (`Interface#operation`).
        operation: String,
        /// Declared parameter count.
        expected: usize,
        /// Number of arguments supplied at the call site.
        actual: usize,
    },

    /// An interface shape declares the same operation id twice.
    #[error("Interface '{interface}' declares operation '{operation}' more than once")]
    DuplicateOperation {
        /// The declaring interface.
        interface: String,
        /// The repeated operation id.
        operation: String,
    },

    /// Two shapes with the same interface name were registered.
    #[error("Interface '{name}' is registered more than once")]
    DuplicateInterface {
        /// The repeated interface name.
        name: String,
    },

    /// An interface, operation, or parameter name is empty.
    #[error("Invalid name: {message}")]
    InvalidName {
        /// Description of which name was invalid.
        message: String,
    },
}

impl ChainError {
    /// Configuration errors are never retryable.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::NonRetryable
    }
}
