//! Catena HTTP adapter.
//!
//! Implements the [`chain::Dispatcher`] port over HTTP: every terminal call
//! of a fluent chain becomes one request, built from the operation's
//! [`Endpoint`] and the merged argument vector the chain accumulated.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Request templates, parameter expansion, HTTP client
//! configuration, and status/transport error mapping all live here. The
//! [`chain`] crate sees only [`chain::Dispatcher`].
//!
//! ## Declaring endpoints
//!
//! Parameters are bound to the **whole merged argument vector**, so the
//! arguments captured by fluent calls are declared first:
//!
//! ```
//! use transport::{Endpoint, EndpointTable};
//!
//! // products(store_id).get(product_id)
//! let table = EndpointTable::new()
//!     .with(
//!         "ProductApi",
//!         "get",
//!         Endpoint::parse("GET /api/stores/{store_id}/products/{product_id}")
//!             .unwrap()
//!             .param("store_id")
//!             .param("product_id"),
//!     )
//!     .unwrap();
//! assert_eq!(table.len(), 1);
//! ```
//!
//! ## Module Layout
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`config`]    | `TransportConfig`: base URL, timeouts, default headers |
//! | [`template`]  | Request-line and body templates, `Bindings`            |
//! | [`expander`]  | `Expander` trait, `LowerCase`, `Clamp`                 |
//! | [`endpoint`]  | `Endpoint`, `EndpointTable`                            |
//! | [`client`]    | `HttpDispatcher`, `Response`                           |
//! | [`errors`]    | `TransportError`                                       |

pub mod client;
pub mod config;
pub mod endpoint;
pub mod errors;
pub mod expander;
pub mod template;

pub use client::{HttpDispatcher, Response};
pub use config::TransportConfig;
pub use endpoint::{Endpoint, EndpointTable};
pub use errors::TransportError;
pub use expander::{render_default, Clamp, Expander, LowerCase};
pub use template::{Bindings, RenderedRequest, RequestTemplate};
