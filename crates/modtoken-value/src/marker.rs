// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Opaque unique markers (symbol-like injection tokens).

use std::sync::Arc;

use crate::anchor::{NodeId, WeakAnchor};

/// A unique marker with an optional description.
///
/// Every call to [`Marker::new`] produces a distinct marker, and equality is
/// identity. Hashing only sees the description, so two markers with the same
/// description are interchangeable in a token.
#[derive(Clone, Debug)]
pub struct Marker(Arc<Option<String>>);

impl Marker {
    /// Create a fresh marker with a description.
    pub fn new(description: impl Into<String>) -> Self {
        Self(Arc::new(Some(description.into())))
    }

    /// Create a fresh marker without a description.
    pub fn anonymous() -> Self {
        Self(Arc::new(None))
    }

    /// The marker's description, if any.
    pub fn description(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Identity of this marker.
    pub fn node_id(&self) -> NodeId {
        NodeId::of(&self.0)
    }

    /// Non-owning handle to this marker.
    pub fn anchor(&self) -> WeakAnchor {
        WeakAnchor::new(&self.0)
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Marker {}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_identity() {
        let a = Marker::new("a");
        let b = Marker::new("a");
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
        assert_eq!(a.description(), b.description());
    }

    #[test]
    fn display_mirrors_symbol_text() {
        assert_eq!(Marker::new("cfg").to_string(), "Symbol(cfg)");
        assert_eq!(Marker::anonymous().to_string(), "Symbol()");
    }
}
