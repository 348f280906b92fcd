//! Interface shapes and the contract that ties them together.
//!
//! An [`InterfaceShape`] is the dispatch table for one declared interface: it
//! maps each operation id to an [`OperationShape`] saying whether the
//! operation is terminal or fluent and which parameters it takes. A
//! [`Contract`] is the validated set of shapes reachable from a root
//! interface. Both are built once, up front, and shared read-only by every
//! stand-in created from them.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{ChainError, InterfaceName, OperationId};

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Whether invoking an operation ends a chain or extends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    /// The operation's result is a plain value; invoking it dispatches.
    Terminal,
    /// The operation's result is another interface; invoking it captures the
    /// call's arguments and returns a stand-in for `returns`.
    Fluent {
        /// The interface the returned stand-in is bound to.
        returns: InterfaceName,
    },
}

impl OperationKind {
    /// Returns `true` for [`OperationKind::Fluent`].
    pub fn is_fluent(&self) -> bool {
        matches!(self, Self::Fluent { .. })
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Terminal => "terminal",
            Self::Fluent { .. } => "fluent",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Terminal => write!(f, "terminal"),
            Self::Fluent { returns } => write!(f, "fluent -> {returns}"),
        }
    }
}

/// One declared operation of an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationShape {
    id: OperationId,
    kind: OperationKind,
    parameters: Vec<String>,
}

impl OperationShape {
    /// The operation id.
    pub fn id(&self) -> &OperationId {
        &self.id
    }

    /// Terminal or fluent.
    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    /// Declared parameter names, in call order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Number of arguments a call must supply.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

// ---------------------------------------------------------------------------
// Interfaces
// ---------------------------------------------------------------------------

/// The dispatch table for one declared interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceShape {
    name: InterfaceName,
    operations: BTreeMap<OperationId, OperationShape>,
}

impl InterfaceShape {
    /// Starts declaring an interface called `name`.
    pub fn builder(name: impl Into<String>) -> InterfaceShapeBuilder {
        InterfaceShapeBuilder {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// The interface name.
    pub fn name(&self) -> &InterfaceName {
        &self.name
    }

    /// Looks up a declared operation.
    pub fn operation(&self, id: &str) -> Option<&OperationShape> {
        self.operations.get(id)
    }

    /// Iterates over declared operations in id order.
    pub fn operations(&self) -> impl Iterator<Item = &OperationShape> {
        self.operations.values()
    }

    /// Names of interfaces returned by this interface's fluent operations.
    pub fn fluent_targets(&self) -> impl Iterator<Item = &InterfaceName> {
        self.operations.values().filter_map(|op| match &op.kind {
            OperationKind::Fluent { returns } => Some(returns),
            OperationKind::Terminal => None,
        })
    }
}

struct PendingOperation {
    id: String,
    parameters: Vec<String>,
    returns: Option<String>,
}

/// Collects operation declarations; validation happens in [`Self::build`].
pub struct InterfaceShapeBuilder {
    name: String,
    operations: Vec<PendingOperation>,
}

impl InterfaceShapeBuilder {
    /// Declares a terminal operation taking `parameters`.
    #[must_use]
    pub fn terminal(mut self, id: impl Into<String>, parameters: &[&str]) -> Self {
        self.operations.push(PendingOperation {
            id: id.into(),
            parameters: parameters.iter().map(|p| (*p).to_owned()).collect(),
            returns: None,
        });
        self
    }

    /// Declares a fluent operation taking `parameters` and returning a
    /// stand-in for the interface `returns`.
    #[must_use]
    pub fn fluent(
        mut self,
        id: impl Into<String>,
        parameters: &[&str],
        returns: impl Into<String>,
    ) -> Self {
        self.operations.push(PendingOperation {
            id: id.into(),
            parameters: parameters.iter().map(|p| (*p).to_owned()).collect(),
            returns: Some(returns.into()),
        });
        self
    }

    /// Validates the declarations and produces the shape.
    ///
    /// Fails on empty names and on operation ids declared twice. Whether
    /// fluent targets exist is checked later, by [`ContractBuilder::build`].
    pub fn build(self) -> Result<InterfaceShape, ChainError> {
        let name = InterfaceName::new(self.name).ok_or_else(|| ChainError::InvalidName {
            message: "interface name is empty".into(),
        })?;

        let mut operations = BTreeMap::new();
        for pending in self.operations {
            let id = OperationId::new(pending.id).ok_or_else(|| ChainError::InvalidName {
                message: format!("interface '{name}' declares an operation with an empty id"),
            })?;

            if pending.parameters.iter().any(String::is_empty) {
                return Err(ChainError::InvalidName {
                    message: format!("operation '{name}#{id}' declares an empty parameter name"),
                });
            }

            let kind = match pending.returns {
                None => OperationKind::Terminal,
                Some(returns) => OperationKind::Fluent {
                    returns: InterfaceName::new(returns).ok_or_else(|| {
                        ChainError::InvalidName {
                            message: format!(
                                "operation '{name}#{id}' returns an empty interface name"
                            ),
                        }
                    })?,
                },
            };

            if operations.contains_key(&id) {
                return Err(ChainError::DuplicateOperation {
                    interface: name.to_string(),
                    operation: id.to_string(),
                });
            }

            operations.insert(
                id.clone(),
                OperationShape {
                    id,
                    kind,
                    parameters: pending.parameters,
                },
            );
        }

        Ok(InterfaceShape { name, operations })
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// The validated set of interface shapes reachable from a root interface.
#[derive(Debug)]
pub struct Contract {
    root: Arc<InterfaceShape>,
    shapes: BTreeMap<InterfaceName, Arc<InterfaceShape>>,
}

impl Contract {
    /// Starts collecting shapes.
    pub fn builder() -> ContractBuilder {
        ContractBuilder::default()
    }

    /// Builds a contract from `shapes` with `root` as the entry interface.
    pub fn new(
        root: &str,
        shapes: impl IntoIterator<Item = InterfaceShape>,
    ) -> Result<Self, ChainError> {
        let mut builder = Self::builder();
        for shape in shapes {
            builder.insert(shape)?;
        }
        builder.build(root)
    }

    /// The root interface's shape.
    pub fn root(&self) -> &Arc<InterfaceShape> {
        &self.root
    }

    /// Looks up a registered shape by interface name.
    pub fn shape(&self, name: &str) -> Result<&Arc<InterfaceShape>, ChainError> {
        self.shapes
            .get(name)
            .ok_or_else(|| ChainError::UnknownInterface {
                name: name.to_owned(),
            })
    }

    /// Iterates over registered interface names in order.
    pub fn interfaces(&self) -> impl Iterator<Item = &InterfaceName> {
        self.shapes.keys()
    }
}

/// Accumulates shapes for a [`Contract`].
#[derive(Default)]
pub struct ContractBuilder {
    shapes: BTreeMap<InterfaceName, InterfaceShape>,
}

impl ContractBuilder {
    /// Returns `true` if a shape called `name` has been inserted.
    pub fn contains(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    /// Adds a shape. Interface names must be unique.
    pub fn insert(&mut self, shape: InterfaceShape) -> Result<(), ChainError> {
        if self.shapes.contains_key(shape.name()) {
            return Err(ChainError::DuplicateInterface {
                name: shape.name().to_string(),
            });
        }
        self.shapes.insert(shape.name().clone(), shape);
        Ok(())
    }

    /// Validates cross-references and freezes the contract.
    ///
    /// The root must be registered, and every fluent operation must return a
    /// registered interface.
    pub fn build(self, root: &str) -> Result<Contract, ChainError> {
        for shape in self.shapes.values() {
            if let Some(missing) = shape
                .fluent_targets()
                .find(|target| !self.shapes.contains_key(target.as_str()))
            {
                return Err(ChainError::UnknownInterface {
                    name: missing.to_string(),
                });
            }
        }

        let shapes: BTreeMap<InterfaceName, Arc<InterfaceShape>> = self
            .shapes
            .into_iter()
            .map(|(name, shape)| (name, Arc::new(shape)))
            .collect();

        let root = shapes
            .get(root)
            .cloned()
            .ok_or_else(|| ChainError::UnknownInterface {
                name: root.to_owned(),
            })?;

        Ok(Contract { root, shapes })
    }
}
