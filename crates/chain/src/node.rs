//! Chain nodes: the immutable per-link state of a fluent chain.

use std::sync::Arc;

use crate::arguments::merge;
use crate::{ArgumentVector, Contract, Dispatcher};

/// One link in a fluent call chain.
///
/// A node shares the terminal dispatcher and the contract with every other
/// node of its chain tree and owns the argument vector accumulated from the
/// root down to this link. The root node has no vector yet.
///
/// Nodes are never modified. Descending produces a new node, so any number
/// of sibling continuations may be derived from the same parent.
pub struct ChainNode<D: Dispatcher> {
    dispatcher: Arc<D>,
    contract: Arc<Contract>,
    arguments: Option<ArgumentVector>,
    depth: usize,
}

impl<D: Dispatcher> ChainNode<D> {
    /// Creates the root node of a chain tree.
    pub fn root(contract: Arc<Contract>, dispatcher: Arc<D>) -> Self {
        Self {
            dispatcher,
            contract,
            arguments: None,
            depth: 0,
        }
    }

    /// The shared terminal dispatcher.
    pub fn dispatcher(&self) -> &Arc<D> {
        &self.dispatcher
    }

    /// The shared contract.
    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    /// Arguments captured from the root down to this node; `None` at the root.
    pub fn arguments(&self) -> Option<&ArgumentVector> {
        self.arguments.as_ref()
    }

    /// Number of fluent calls between the root and this node.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Merges this node's captured vector with a call's arguments.
    pub fn merge(&self, call: &ArgumentVector) -> ArgumentVector {
        merge(self.arguments.as_ref(), Some(call))
    }

    /// Creates the child node for a fluent call made with `call` arguments.
    pub fn descend(&self, call: &ArgumentVector) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            contract: Arc::clone(&self.contract),
            arguments: Some(self.merge(call)),
            depth: self.depth + 1,
        }
    }
}

impl<D: Dispatcher> std::fmt::Debug for ChainNode<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainNode")
            .field("arguments", &self.arguments)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
