//! Fluent call-chain core for Catena.
//!
//! A caller declares interfaces whose operations are either *terminal* (they
//! produce a value by dispatching a remote call) or *fluent* (they return
//! another, narrower interface). This crate produces dispatchable stand-ins
//! for those interfaces and arranges that the arguments of every fluent call
//! are prepended, in call order, to the arguments of every later call made
//! through the returned stand-in. Terminal calls hand the accumulated vector
//! to a [`Dispatcher`].
//!
//! ```ignore
//! let api = StoreApi::target(Arc::new(dispatcher))?;
//! // Dispatches ProductApi#get with ["store_1", "product_1"].
//! let product = api.products("store_1")?.get("product_1").await?;
//! ```
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies
//! and parses no request templates. Request building and transport are
//! supplied by an implementation of [`Dispatcher`].
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | `InterfaceName`, `OperationId`, `OperationKey`, `InvocationId` |
//! | [`arguments`] | `ArgumentVector` and `merge` |
//! | [`shape`] | Interface dispatch tables and the validated `Contract` |
//! | [`node`] | `ChainNode`, the immutable per-link state |
//! | [`proxy`] | `FluentProxy` stand-ins and `Outcome` |
//! | [`dispatcher`] | The `Dispatcher` port |
//! | [`interface`] | Typed-stub trait and root construction |
//! | [`errors`] | `ChainError` and `RetryPolicy` |

pub mod arguments;
pub mod dispatcher;
pub mod errors;
pub mod identifiers;
pub mod interface;
mod macros;
pub mod node;
pub mod proxy;
pub mod shape;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use arguments::{merge, ArgumentVector};
pub use dispatcher::Dispatcher;
pub use errors::{ChainError, RetryPolicy};
pub use identifiers::{InterfaceName, InvocationId, OperationId, OperationKey};
pub use interface::{contract_for, target, Interface};
pub use node::ChainNode;
pub use proxy::{FluentProxy, Outcome};
pub use shape::{
    Contract, ContractBuilder, InterfaceShape, InterfaceShapeBuilder, OperationKind,
    OperationShape,
};

pub use serde_json::Value;
