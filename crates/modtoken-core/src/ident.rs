// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-type random identities.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use modtoken_value::ModuleType;
use rand::RngCore;
use tracing::debug;

use crate::config::MIN_IDENTITY_BYTES;
use crate::ephemeral::EphemeralMap;

/// Random string bound to one module type for the lifetime of that type.
///
/// Never persisted and never recomputed once assigned.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ModuleIdentity(Arc<str>);

impl ModuleIdentity {
    /// Wrap an existing identity string.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// The identity as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Source of fresh identity strings.
///
/// Implementations must return a different string on (almost) every call.
pub trait IdentitySource: Send + Sync {
    /// Produce a fresh identity string.
    fn generate(&self) -> String;
}

/// Lowercase hex of `bytes` random bytes from the thread-local CSPRNG.
#[derive(Clone, Copy, Debug)]
pub struct RandomIdentitySource {
    bytes: usize,
}

impl RandomIdentitySource {
    /// Source producing `bytes` random bytes per identity, clamped to
    /// [`MIN_IDENTITY_BYTES`].
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes: bytes.max(MIN_IDENTITY_BYTES),
        }
    }
}

impl Default for RandomIdentitySource {
    fn default() -> Self {
        Self::new(MIN_IDENTITY_BYTES)
    }
}

impl IdentitySource for RandomIdentitySource {
    fn generate(&self) -> String {
        let mut buf = vec![0u8; self.bytes];
        rand::thread_rng().fill_bytes(&mut buf);
        hex::encode(buf)
    }
}

/// Assigns and memoizes one [`ModuleIdentity`] per [`ModuleType`].
///
/// The table holds descriptors weakly. Lookup and insertion happen under one
/// lock, so concurrent first calls for the same type agree on a single identity.
pub struct IdentityAssigner<S = RandomIdentitySource> {
    source: S,
    table: Mutex<EphemeralMap<ModuleIdentity>>,
}

impl<S: IdentitySource> IdentityAssigner<S> {
    /// Create an assigner drawing identities from `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            table: Mutex::new(EphemeralMap::new()),
        }
    }

    /// Identity for `ty`, generating one on first sight.
    pub fn get_or_create(&self, ty: &ModuleType) -> ModuleIdentity {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table
            .get_or_insert_with(&ty.anchor(), || {
                let id = ModuleIdentity::new(self.source.generate());
                debug!(module = ty.name(), %id, "assigned module identity");
                id
            })
            .clone()
    }

    /// Identity for `ty` if one was already assigned.
    pub fn get(&self, ty: &ModuleType) -> Option<ModuleIdentity> {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&ty.anchor())
            .cloned()
    }

    /// Drop entries for descriptors that no longer exist.
    pub fn purge(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .purge()
    }

    /// Number of live assignments.
    pub fn len(&self) -> usize {
        self.table.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no live assignment exists.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for IdentityAssigner<RandomIdentitySource> {
    fn default() -> Self {
        Self::new(RandomIdentitySource::default())
    }
}

impl<S> fmt::Debug for IdentityAssigner<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityAssigner").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_identities_are_128_bit_hex() {
        let id = RandomIdentitySource::default().generate();
        assert_eq!(id.len(), MIN_IDENTITY_BYTES * 2);
        assert!(id.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn short_request_is_clamped() {
        let id = RandomIdentitySource::new(4).generate();
        assert_eq!(id.len(), MIN_IDENTITY_BYTES * 2);
    }

    #[test]
    fn identity_is_stable_per_type() {
        let assigner = IdentityAssigner::default();
        let a = ModuleType::new("A");
        let b = ModuleType::new("B");
        let first = assigner.get_or_create(&a);
        assert_eq!(assigner.get_or_create(&a), first);
        assert_eq!(assigner.get_or_create(&a.clone()), first);
        assert_ne!(assigner.get_or_create(&b), first);
        assert_eq!(assigner.len(), 2);
    }

    #[test]
    fn same_name_distinct_types_get_distinct_ids() {
        let assigner = IdentityAssigner::default();
        let a = ModuleType::new("Dup");
        let b = ModuleType::new("Dup");
        assert_ne!(assigner.get_or_create(&a), assigner.get_or_create(&b));
    }

    #[test]
    fn assigner_does_not_keep_types_alive() {
        let assigner = IdentityAssigner::default();
        let ty = ModuleType::new("Ephemeral");
        let anchor = ty.anchor();
        assigner.get_or_create(&ty);
        drop(ty);
        assert!(!anchor.is_alive());
        assert!(assigner.is_empty());
        assert_eq!(assigner.purge(), 1);
    }

    #[test]
    fn concurrent_first_calls_agree() {
        let assigner = Arc::new(IdentityAssigner::default());
        let ty = ModuleType::new("Shared");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let assigner = Arc::clone(&assigner);
                let ty = ty.clone();
                std::thread::spawn(move || assigner.get_or_create(&ty))
            })
            .collect();
        let ids: Vec<_> = handles.into_iter().filter_map(|h| h.join().ok()).collect();
        assert_eq!(ids.len(), 8);
        assert!(ids.iter().all(|id| *id == ids[0]));
    }
}
