// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Address-based identity for shared nodes.

use std::any::Any;
use std::sync::{Arc, Weak};

/// Process-local identity of a shared node: the address of its allocation.
///
/// Two live handles have the same `NodeId` iff they share one allocation.
/// Ids are never serialized and carry no meaning across runs.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn of<T: ?Sized>(arc: &Arc<T>) -> Self {
        Self(Arc::as_ptr(arc).cast::<()>().addr())
    }

    /// Raw address value, for diagnostics only.
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// Non-owning handle to a shared node.
///
/// Holding an anchor never keeps the node's contents alive. It does keep the
/// allocation reserved, so the [`NodeId`] cannot be handed out to a different
/// node while the anchor exists; a stale anchor simply reports
/// [`is_alive`](WeakAnchor::is_alive) `== false`.
#[derive(Clone)]
pub struct WeakAnchor {
    id: NodeId,
    weak: Weak<dyn Any + Send + Sync>,
}

impl WeakAnchor {
    pub(crate) fn new<T: Any + Send + Sync>(arc: &Arc<T>) -> Self {
        let weak: Weak<T> = Arc::downgrade(arc);
        let weak: Weak<dyn Any + Send + Sync> = weak;
        Self {
            id: NodeId::of(arc),
            weak,
        }
    }

    /// Identity of the anchored node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns `true` while at least one strong handle to the node exists.
    pub fn is_alive(&self) -> bool {
        self.weak.strong_count() > 0
    }
}

impl std::fmt::Debug for WeakAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeakAnchor")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}
