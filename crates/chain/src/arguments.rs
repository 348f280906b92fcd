//! Argument vectors and the merge operation that threads them down a chain.
//!
//! An [`ArgumentVector`] is the ordered list of values captured at one call
//! site. Values are `serde_json::Value`s: the core never looks inside them,
//! and the dispatcher decides how they are rendered.
//!
//! Vectors are immutable. Storage is an `Arc<[Value]>`, so a parent vector
//! shared by several sibling chains is never copied or modified; [`merge`]
//! always allocates a fresh vector when both sides contribute elements.

use std::sync::Arc;

use serde_json::Value;

/// An immutable, ordered, possibly-empty sequence of call arguments.
#[derive(Clone, PartialEq)]
pub struct ArgumentVector(Arc<[Value]>);

impl ArgumentVector {
    /// Creates an empty vector.
    pub fn empty() -> Self {
        Self(Arc::from(Vec::new()))
    }

    /// Creates a vector holding `values` in order.
    pub fn from_values(values: Vec<Value>) -> Self {
        Self(Arc::from(values))
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the vector holds no arguments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the argument at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Returns the arguments as a slice.
    pub fn as_slice(&self) -> &[Value] {
        &self.0
    }

    /// Iterates over the arguments in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// Returns a new vector holding `self`'s elements followed by `other`'s.
    ///
    /// Neither input is modified.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        let mut values = Vec::with_capacity(self.len() + other.len());
        values.extend_from_slice(&self.0);
        values.extend_from_slice(&other.0);
        Self::from_values(values)
    }

    /// Returns `true` if both vectors share the same backing storage.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for ArgumentVector {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for ArgumentVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl From<Vec<Value>> for ArgumentVector {
    fn from(values: Vec<Value>) -> Self {
        Self::from_values(values)
    }
}

impl FromIterator<Value> for ArgumentVector {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::from_values(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ArgumentVector {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Merges a parent link's captured vector with a child call's arguments.
///
/// - parent absent: the child vector, unchanged
/// - child absent or empty: the parent vector, unchanged
/// - both present: parent elements first, then child elements
/// - both absent: an empty vector
///
/// Merge is total. Applying it link by link down a chain yields the same
/// vector as concatenating every link's arguments in call order.
pub fn merge(parent: Option<&ArgumentVector>, child: Option<&ArgumentVector>) -> ArgumentVector {
    match (parent, child) {
        (None, None) => ArgumentVector::empty(),
        (None, Some(child)) => child.clone(),
        (Some(parent), None) => parent.clone(),
        (Some(parent), Some(child)) if child.is_empty() => parent.clone(),
        (Some(parent), Some(child)) => parent.concat(child),
    }
}
