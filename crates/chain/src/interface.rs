//! Typed interfaces and root construction.
//!
//! Types generated by [`crate::fluent_interface!`] implement [`Interface`]:
//! they know their own shape, can register every interface reachable through
//! their fluent operations, and wrap an untyped [`FluentProxy`].

use std::sync::Arc;

use crate::{ChainError, Contract, ContractBuilder, Dispatcher, FluentProxy};

/// A declared interface with a typed stub over [`FluentProxy`].
pub trait Interface<D: Dispatcher>: Sized {
    /// Interface name used in the contract and in operation keys.
    const NAME: &'static str;

    /// Inserts this interface's shape, then the shapes of every interface its
    /// fluent operations return. Already-registered interfaces are skipped,
    /// so self-referencing and mutually recursive interfaces terminate.
    fn register(contract: &mut ContractBuilder) -> Result<(), ChainError>;

    /// Wraps a stand-in that is bound to this interface's shape.
    fn bind(proxy: FluentProxy<D>) -> Self;
}

/// Builds the contract rooted at `T`.
pub fn contract_for<T, D>() -> Result<Contract, ChainError>
where
    T: Interface<D>,
    D: Dispatcher,
{
    let mut builder = Contract::builder();
    T::register(&mut builder)?;
    builder.build(T::NAME)
}

/// Builds the contract rooted at `T` and returns `T`'s root stand-in, bound
/// to `dispatcher`.
pub fn target<T, D>(dispatcher: Arc<D>) -> Result<T, ChainError>
where
    T: Interface<D>,
    D: Dispatcher,
{
    let contract = contract_for::<T, D>()?;
    tracing::debug!(
        root = T::NAME,
        interfaces = contract.interfaces().count(),
        "Built interface contract"
    );
    Ok(T::bind(FluentProxy::root(Arc::new(contract), dispatcher)))
}
