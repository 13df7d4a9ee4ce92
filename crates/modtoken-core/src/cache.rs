// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Token memo tables.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use modtoken_value::WeakAnchor;
use tracing::trace;

use crate::compose::Token;
use crate::ephemeral::EphemeralMap;

/// Hit/miss counters. `general_*` counts reference-table lookups only.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CacheStats {
    /// Fast-table hits.
    pub fast_hits: u64,
    /// Fast-table misses.
    pub fast_misses: u64,
    /// General-table hits.
    pub general_hits: u64,
    /// General-table misses.
    pub general_misses: u64,
}

#[derive(Debug, Default)]
struct Counters {
    fast_hits: AtomicU64,
    fast_misses: AtomicU64,
    general_hits: AtomicU64,
    general_misses: AtomicU64,
}

/// Token memo tables, every one keyed weakly.
///
/// - The fast table maps a module type to its metadata-free token.
/// - The reference table maps a metadata object, then a module type, to the
///   token computed for that pair.
///
/// Content-hash tokens are not stored: they are recomputed from the
/// canonical record on every call.
///
/// Every `get-or-insert` runs under the table's lock.
///
/// # Retention
///
/// Entries for dropped module types or metadata objects stop matching at
/// once and are reclaimed by [`purge`](TokenCache::purge) or by the owning
/// map's growth sweep.
#[derive(Debug, Default)]
pub struct TokenCache {
    fast: Mutex<EphemeralMap<Token>>,
    reference: Mutex<EphemeralMap<EphemeralMap<Token>>>,
    counters: Counters,
}

impl TokenCache {
    /// Create empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-table lookup for `module`, computing and storing on miss.
    pub fn fast(&self, module: &WeakAnchor, make: impl FnOnce() -> Token) -> Token {
        let mut table = self.fast.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = table.get(module) {
            self.counters.fast_hits.fetch_add(1, Ordering::Relaxed);
            trace!(module = module.id().as_usize(), "fast-path hit");
            return token.clone();
        }
        self.counters.fast_misses.fetch_add(1, Ordering::Relaxed);
        let token = make();
        table.get_or_insert_with(module, || token.clone());
        token
    }

    /// Reference-table lookup keyed by the metadata object, then the module
    /// type. Both are held weakly.
    pub fn by_reference(
        &self,
        metadata: &WeakAnchor,
        module: &WeakAnchor,
        make: impl FnOnce() -> Token,
    ) -> Token {
        let mut table = self
            .reference
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let per_module = table.get_or_insert_with(metadata, EphemeralMap::new);
        if let Some(token) = per_module.get(module) {
            self.counters.general_hits.fetch_add(1, Ordering::Relaxed);
            trace!(module = module.id().as_usize(), "reference hit");
            return token.clone();
        }
        self.counters.general_misses.fetch_add(1, Ordering::Relaxed);
        let token = make();
        per_module.get_or_insert_with(module, || token.clone());
        token
    }

    /// Snapshot of the hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            fast_hits: self.counters.fast_hits.load(Ordering::Relaxed),
            fast_misses: self.counters.fast_misses.load(Ordering::Relaxed),
            general_hits: self.counters.general_hits.load(Ordering::Relaxed),
            general_misses: self.counters.general_misses.load(Ordering::Relaxed),
        }
    }

    /// Drop entries whose module type or metadata object is gone. Returns
    /// the number removed.
    pub fn purge(&self) -> usize {
        let fast = self
            .fast
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .purge();
        let mut reference = self
            .reference
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let objects = reference.purge();
        let pairs: usize = reference.values_mut().map(EphemeralMap::purge).sum();
        fast + objects + pairs
    }

    /// Empty every table. Counters are kept.
    pub fn clear(&self) {
        self.fast
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.reference
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
