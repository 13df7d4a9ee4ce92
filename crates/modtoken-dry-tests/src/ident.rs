// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deterministic identity sources.

use modtoken_core::IdentitySource;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Identity source that always returns the same string.
///
/// Every module type gets the same identity, which pins tokens to known values
/// in tests.
///
/// # Example
///
/// ```
/// use modtoken_core::IdentitySource;
/// use modtoken_dry_tests::FixedIdentitySource;
///
/// let source = FixedIdentitySource::new("constId");
/// assert_eq!(source.generate(), "constId");
/// assert_eq!(source.generate(), "constId");
/// ```
#[derive(Clone, Debug)]
pub struct FixedIdentitySource {
    id: String,
}

impl FixedIdentitySource {
    /// Source returning `id` on every call.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl IdentitySource for FixedIdentitySource {
    fn generate(&self) -> String {
        self.id.clone()
    }
}

/// Identity source yielding `id1`, `id2`, ... and counting its calls.
///
/// Clones share the counter.
#[derive(Clone, Debug, Default)]
pub struct SequenceIdentitySource {
    next: Arc<AtomicUsize>,
}

impl SequenceIdentitySource {
    /// Source starting at `id1`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identities generated so far.
    pub fn generated(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

impl IdentitySource for SequenceIdentitySource {
    fn generate(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        format!("id{n}")
    }
}
