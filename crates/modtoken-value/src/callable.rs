// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Callable leaves (factories, class constructors).

use std::sync::Arc;

use crate::anchor::{NodeId, WeakAnchor};

/// How a callable is treated for hashing purposes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CallableKind {
    /// Source text is a class definition; identified by name.
    Constructor,
    /// Any other function; identified by its source text.
    Function,
}

#[derive(Debug)]
struct CallableInner {
    name: String,
    source: String,
}

/// A callable captured in metadata: its declared name plus its source text.
///
/// The tokenizer never invokes a callable. Only `name` and `source` matter, and
/// [`kind`](Callable::kind) decides which of the two is used.
#[derive(Clone, Debug)]
pub struct Callable(Arc<CallableInner>);

impl Callable {
    /// Create a callable from its name and source text.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self(Arc::new(CallableInner {
            name: name.into(),
            source: source.into(),
        }))
    }

    /// Create a class-like constructor with an empty body.
    pub fn constructor(name: impl Into<String>) -> Self {
        let name = name.into();
        let source = format!("class {name} {{}}");
        Self::new(name, source)
    }

    /// Create an unnamed function from its source text.
    pub fn anonymous(source: impl Into<String>) -> Self {
        Self::new(String::new(), source)
    }

    /// Declared name; empty for anonymous callables.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Source text.
    pub fn source(&self) -> &str {
        &self.0.source
    }

    /// Classify the callable from its source text.
    ///
    /// Source beginning with the `class` keyword (followed by whitespace or a
    /// body) is a [`CallableKind::Constructor`].
    pub fn kind(&self) -> CallableKind {
        if looks_like_class(&self.0.source) {
            CallableKind::Constructor
        } else {
            CallableKind::Function
        }
    }

    /// Identity of this handle.
    pub fn node_id(&self) -> NodeId {
        NodeId::of(&self.0)
    }

    /// Non-owning handle to this callable.
    pub fn anchor(&self) -> WeakAnchor {
        WeakAnchor::new(&self.0)
    }

    /// Returns `true` if both handles share one allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

fn looks_like_class(source: &str) -> bool {
    source
        .trim_start()
        .strip_prefix("class")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_whitespace() || c == '{')
}
