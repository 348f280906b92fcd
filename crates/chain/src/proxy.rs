//! Fluent stand-ins: the dispatchable objects callers invoke.
//!
//! A [`FluentProxy`] is bound to one interface shape and one [`ChainNode`].
//! Invoking a declared operation on it merges the node's captured vector with
//! the call's arguments and then either forwards the merged vector to the
//! [`Dispatcher`] (terminal operations) or returns a new stand-in bound to a
//! child node carrying the merged vector (fluent operations).

use std::sync::Arc;

use tracing::Instrument;

use crate::{
    ArgumentVector, ChainError, ChainNode, Contract, Dispatcher, InterfaceName, InterfaceShape,
    InvocationId, OperationKey, OperationKind, OperationShape,
};

/// The result of [`FluentProxy::invoke`].
pub enum Outcome<D: Dispatcher> {
    /// A terminal operation was dispatched and produced this value.
    Value(D::Output),
    /// A fluent operation was invoked; continue the chain on this stand-in.
    Chain(FluentProxy<D>),
}

impl<D: Dispatcher> Outcome<D> {
    /// Returns the dispatched value, or `None` for a fluent outcome.
    pub fn into_value(self) -> Option<D::Output> {
        match self {
            Self::Value(value) => Some(value),
            Self::Chain(_) => None,
        }
    }

    /// Returns the next stand-in, or `None` for a terminal outcome.
    pub fn into_chain(self) -> Option<FluentProxy<D>> {
        match self {
            Self::Value(_) => None,
            Self::Chain(proxy) => Some(proxy),
        }
    }

    /// Returns `true` if the chain continues.
    pub fn is_chain(&self) -> bool {
        matches!(self, Self::Chain(_))
    }
}

impl<D> std::fmt::Debug for Outcome<D>
where
    D: Dispatcher,
    D::Output: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Chain(proxy) => f.debug_tuple("Chain").field(proxy).finish(),
        }
    }
}

/// A dispatchable stand-in for one interface, bound to one chain link.
///
/// Stand-ins are cheap to clone and may be invoked any number of times;
/// every fluent call derives an independent child, so divergent
/// continuations from the same stand-in never see each other's arguments.
pub struct FluentProxy<D: Dispatcher> {
    shape: Arc<InterfaceShape>,
    node: Arc<ChainNode<D>>,
}

impl<D: Dispatcher> Clone for FluentProxy<D> {
    fn clone(&self) -> Self {
        Self {
            shape: Arc::clone(&self.shape),
            node: Arc::clone(&self.node),
        }
    }
}

impl<D: Dispatcher> FluentProxy<D> {
    /// Creates the stand-in for `contract`'s root interface.
    pub fn root(contract: Arc<Contract>, dispatcher: Arc<D>) -> Self {
        let shape = Arc::clone(contract.root());
        Self {
            shape,
            node: Arc::new(ChainNode::root(contract, dispatcher)),
        }
    }

    /// The interface this stand-in is bound to.
    pub fn interface(&self) -> &InterfaceName {
        self.shape.name()
    }

    /// The interface's dispatch table.
    pub fn shape(&self) -> &Arc<InterfaceShape> {
        &self.shape
    }

    /// The chain link this stand-in is bound to.
    pub fn node(&self) -> &ChainNode<D> {
        &self.node
    }

    /// Arguments captured by the fluent calls that produced this stand-in.
    pub fn captured(&self) -> Option<&ArgumentVector> {
        self.node.arguments()
    }

    /// Invokes `operation`, whatever its kind.
    ///
    /// Terminal operations dispatch and yield [`Outcome::Value`]; fluent
    /// operations yield [`Outcome::Chain`] without dispatching.
    pub async fn invoke(
        &self,
        operation: &str,
        arguments: ArgumentVector,
    ) -> Result<Outcome<D>, D::Error> {
        let declared = self.resolve(operation, &arguments)?;
        match declared.kind() {
            OperationKind::Terminal => self
                .forward(declared, &arguments)
                .await
                .map(Outcome::Value),
            OperationKind::Fluent { returns } => self
                .descend(declared, returns, &arguments)
                .map(Outcome::Chain),
        }
    }

    /// Invokes a fluent operation and returns the next stand-in.
    pub fn fluent(&self, operation: &str, arguments: ArgumentVector) -> Result<Self, D::Error> {
        let declared = self.resolve(operation, &arguments)?;
        match declared.kind() {
            OperationKind::Fluent { returns } => self.descend(declared, returns, &arguments),
            OperationKind::Terminal => Err(self.reject(self.kind_mismatch(declared, "fluent"))),
        }
    }

    /// Invokes a terminal operation and returns the dispatcher's result.
    pub async fn terminal(
        &self,
        operation: &str,
        arguments: ArgumentVector,
    ) -> Result<D::Output, D::Error> {
        let declared = self.resolve(operation, &arguments)?;
        if declared.kind().is_fluent() {
            return Err(self.reject(self.kind_mismatch(declared, "terminal")));
        }
        self.forward(declared, &arguments).await
    }

    fn resolve(
        &self,
        operation: &str,
        arguments: &ArgumentVector,
    ) -> Result<&OperationShape, D::Error> {
        let Some(declared) = self.shape.operation(operation) else {
            return Err(self.reject(ChainError::UnknownOperation {
                interface: self.shape.name().to_string(),
                operation: operation.to_owned(),
            }));
        };

        if declared.arity() != arguments.len() {
            return Err(self.reject(ChainError::ArityMismatch {
                operation: self.key(declared).to_string(),
                expected: declared.arity(),
                actual: arguments.len(),
            }));
        }

        Ok(declared)
    }

    async fn forward(
        &self,
        declared: &OperationShape,
        arguments: &ArgumentVector,
    ) -> Result<D::Output, D::Error> {
        let key = self.key(declared);
        let merged = self.node.merge(arguments);
        let span = tracing::debug_span!(
            "terminal_call",
            operation = %key,
            invocation = %InvocationId::new_random(),
            depth = self.node.depth(),
            arguments = merged.len(),
        );

        async move {
            tracing::debug!("Forwarding merged arguments to dispatcher");
            self.node.dispatcher().dispatch(&key, merged).await
        }
        .instrument(span)
        .await
    }

    fn descend(
        &self,
        declared: &OperationShape,
        returns: &InterfaceName,
        arguments: &ArgumentVector,
    ) -> Result<Self, D::Error> {
        let shape = match self.node.contract().shape(returns.as_str()) {
            Ok(shape) => Arc::clone(shape),
            Err(error) => return Err(self.reject(error)),
        };

        let node = self.node.descend(arguments);
        tracing::trace!(
            operation = %self.key(declared),
            returns = %returns,
            depth = node.depth(),
            captured = node.arguments().map_or(0, ArgumentVector::len),
            "Captured fluent call"
        );

        Ok(Self {
            shape,
            node: Arc::new(node),
        })
    }

    fn key(&self, declared: &OperationShape) -> OperationKey {
        OperationKey::new(self.shape.name().clone(), declared.id().clone())
    }

    fn kind_mismatch(&self, declared: &OperationShape, expected: &str) -> ChainError {
        ChainError::KindMismatch {
            operation: self.key(declared).to_string(),
            expected: expected.to_owned(),
            actual: declared.kind().label().to_owned(),
        }
    }

    fn reject(&self, error: ChainError) -> D::Error {
        tracing::error!(
            interface = %self.shape.name(),
            depth = self.node.depth(),
            %error,
            "Rejected chained call"
        );
        D::Error::from(error)
    }
}

impl<D: Dispatcher> std::fmt::Debug for FluentProxy<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FluentProxy")
            .field("interface", self.shape.name())
            .field("captured", &self.node.arguments())
            .field("depth", &self.node.depth())
            .finish()
    }
}
