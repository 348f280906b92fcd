//! Newtype identifiers for interfaces, operations, and invocations.
//!
//! Interface and operation names are distinct newtypes so an operation id can
//! never be passed where an interface name is expected, even though both wrap
//! a `String`. [`OperationKey`] pairs the two and is the operation identity the
//! [`crate::Dispatcher`] receives.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Borrow<str>, Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (declared names)
// ---------------------------------------------------------------------------

string_id! {
    /// Names a declared interface shape (e.g. `"StoreApi"`).
    ///
    /// Interface names are unique within a [`crate::Contract`].
    InterfaceName
}

string_id! {
    /// Names one operation within an interface shape (e.g. `"products"`).
    ///
    /// Operation ids are unique per interface, not globally: two interfaces
    /// may both declare `get`.
    OperationId
}

// ---------------------------------------------------------------------------
// Operation identity
// ---------------------------------------------------------------------------

/// Fully qualified operation identity: the declaring interface plus the
/// operation id.
///
/// Rendered as `Interface#operation`. Dispatchers key their request metadata
/// on this value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationKey {
    interface: InterfaceName,
    operation: OperationId,
}

impl OperationKey {
    /// Creates a key from an interface name and an operation id.
    pub fn new(interface: InterfaceName, operation: OperationId) -> Self {
        Self {
            interface,
            operation,
        }
    }

    /// Creates a key from raw names, returning `None` if either is empty.
    pub fn parse(interface: &str, operation: &str) -> Option<Self> {
        Some(Self::new(
            InterfaceName::new(interface)?,
            OperationId::new(operation)?,
        ))
    }

    /// The interface that declares the operation.
    pub fn interface(&self) -> &InterfaceName {
        &self.interface
    }

    /// The operation id within the interface.
    pub fn operation(&self) -> &OperationId {
        &self.operation
    }
}

impl std::fmt::Display for OperationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.interface, self.operation)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single terminal invocation.
///
/// Generated fresh for every forwarded call and attached to its tracing span
/// so the chain-side and transport-side events of one call can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Generates a new random invocation identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an [`InvocationId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_names_are_rejected() {
        assert!(InterfaceName::new("").is_none());
        assert!(OperationId::new(String::new()).is_none());
        assert!(OperationKey::parse("StoreApi", "").is_none());
    }

    #[test]
    fn operation_key_renders_interface_and_operation() {
        let key = OperationKey::parse("ProductApi", "get").expect("valid key");
        assert_eq!(key.to_string(), "ProductApi#get");
        assert_eq!(key.interface().as_str(), "ProductApi");
        assert_eq!(key.operation().as_str(), "get");
    }

    #[test]
    fn invocation_ids_are_unique() {
        assert_ne!(InvocationId::new_random(), InvocationId::new_random());
    }
}
