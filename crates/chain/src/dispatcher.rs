//! The terminal dispatch port.
//!
//! [`Dispatcher`] is the boundary between the chaining core and whatever turns
//! an operation plus its arguments into a real remote call. The core never
//! inspects, wraps, or retries what a dispatcher returns.

use async_trait::async_trait;

use crate::{ArgumentVector, ChainError, OperationKey};

/// Turns an operation identity and a merged argument vector into a result.
///
/// Implementations must accept an empty argument vector and must keep the
/// argument order they are given. They are shared by every chain built from
/// one root stand-in, so they must be safe for concurrent use.
///
/// `Error` must be constructible from [`ChainError`] so callers handle a
/// single error type. Chaining configuration errors arrive as whatever
/// variant that conversion produces; dispatcher failures arrive exactly as
/// the dispatcher returned them.
#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    /// Value produced by a successful terminal call.
    type Output: Send;

    /// Failure produced by a terminal call or by the chaining core.
    type Error: From<ChainError> + Send;

    /// Performs the terminal call.
    async fn dispatch(
        &self,
        operation: &OperationKey,
        arguments: ArgumentVector,
    ) -> Result<Self::Output, Self::Error>;
}
