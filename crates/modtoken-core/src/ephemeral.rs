// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Weak-keyed map: entries tied to the lifetime of their key node.

use std::collections::HashMap;

use modtoken_value::{NodeId, WeakAnchor};

const MIN_SWEEP_THRESHOLD: usize = 64;

/// Map from a shared node's identity to a value, holding the key weakly.
///
/// The map never keeps a key node alive. Entries whose node has been dropped
/// are invisible to lookups and are physically removed by [`purge`] or by the
/// automatic sweep that runs when the map doubles in size.
///
/// # Retention
///
/// A dead entry still pins the key's allocation block (not its contents) until
/// it is swept. Long-lived processes that mint many short-lived descriptors
/// should call [`purge`] at teardown points.
///
/// [`purge`]: EphemeralMap::purge
#[derive(Debug)]
pub struct EphemeralMap<V> {
    entries: HashMap<NodeId, (WeakAnchor, V)>,
    sweep_at: usize,
}

impl<V> EphemeralMap<V> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            sweep_at: MIN_SWEEP_THRESHOLD,
        }
    }

    /// Value for a live key.
    pub fn get(&self, key: &WeakAnchor) -> Option<&V> {
        self.entries
            .get(&key.id())
            .filter(|(anchor, _)| anchor.is_alive())
            .map(|(_, v)| v)
    }

    /// Mutable value for a live key.
    pub fn get_mut(&mut self, key: &WeakAnchor) -> Option<&mut V> {
        self.entries
            .get_mut(&key.id())
            .filter(|(anchor, _)| anchor.is_alive())
            .map(|(_, v)| v)
    }

    /// Return the value for `key`, inserting `make()` first if absent or stale.
    pub fn get_or_insert_with(&mut self, key: &WeakAnchor, make: impl FnOnce() -> V) -> &mut V {
        let stale = self
            .entries
            .get(&key.id())
            .is_some_and(|(anchor, _)| !anchor.is_alive());
        if stale {
            self.entries.remove(&key.id());
        }
        if !self.entries.contains_key(&key.id()) {
            self.maybe_sweep();
        }
        &mut self
            .entries
            .entry(key.id())
            .or_insert_with(|| (key.clone(), make()))
            .1
    }

    /// Drop every entry whose key node is gone. Returns the number removed.
    pub fn purge(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, (anchor, _)| anchor.is_alive());
        before - self.entries.len()
    }

    /// Mutable values of all live entries.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries
            .values_mut()
            .filter(|(anchor, _)| anchor.is_alive())
            .map(|(_, v)| v)
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.sweep_at = MIN_SWEEP_THRESHOLD;
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|(anchor, _)| anchor.is_alive())
            .count()
    }

    /// Returns `true` if no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn maybe_sweep(&mut self) {
        if self.entries.len() < self.sweep_at {
            return;
        }
        self.purge();
        self.sweep_at = (self.entries.len() * 2).max(MIN_SWEEP_THRESHOLD);
    }
}

impl<V> Default for EphemeralMap<V> {
    fn default() -> Self {
        Self::new()
    }
}
