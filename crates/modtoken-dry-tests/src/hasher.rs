// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Hasher that records its inputs.

use modtoken_core::{Blake3Hasher, Token, TokenHasher};
use std::sync::{Arc, Mutex};

/// BLAKE3 hasher that keeps a copy of every input it digests.
///
/// Clones share the log, so a test can hand one clone to a factory and inspect
/// the other.
#[derive(Clone, Debug, Default)]
pub struct RecordingHasher {
    inputs: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingHasher {
    /// Create a hasher with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of digests computed.
    pub fn calls(&self) -> usize {
        self.inputs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Copy of every input, oldest first.
    pub fn inputs(&self) -> Vec<Vec<u8>> {
        self.inputs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The most recent input, if any.
    pub fn last_input(&self) -> Option<Vec<u8>> {
        self.inputs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

impl TokenHasher for RecordingHasher {
    fn digest(&self, bytes: &[u8]) -> Token {
        self.inputs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(bytes.to_vec());
        Blake3Hasher.digest(bytes)
    }
}
