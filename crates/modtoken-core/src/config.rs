// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tokenizer configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Smallest accepted identity length in bytes (128 bits of entropy).
pub const MIN_IDENTITY_BYTES: usize = 16;

/// How the general (metadata-bearing) path memoizes tokens.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Canonicalize and digest on every call; structurally equal metadata
    /// always yields equal tokens.
    #[default]
    ContentHash,
    /// Memoize by the metadata object's identity. Repeated calls with the same
    /// reference skip encoding; distinct but equal objects are still encoded
    /// separately, and mutating a metadata object after its first use is not
    /// observed.
    ReferenceIdentity,
}

/// Configuration for a [`ModuleTokenFactory`](crate::ModuleTokenFactory).
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenizerConfig {
    /// General-path memoization policy.
    pub cache_policy: CachePolicy,
    /// Random bytes per module identity.
    pub identity_bytes: usize,
    /// Memoize fast-path (no metadata) tokens.
    pub cache_fast_path: bool,
    /// Memoize general-path tokens per metadata object. Only consulted under
    /// [`CachePolicy::ReferenceIdentity`].
    pub cache_general_path: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            cache_policy: CachePolicy::default(),
            identity_bytes: MIN_IDENTITY_BYTES,
            cache_fast_path: true,
            cache_general_path: true,
        }
    }
}

impl TokenizerConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(bytes)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let config = Self::from_json(&bytes)?;
        debug!(path = %path.display(), ?config, "loaded tokenizer config");
        Ok(config)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_bytes < MIN_IDENTITY_BYTES {
            return Err(ConfigError::IdentityTooShort {
                got: self.identity_bytes,
                min: MIN_IDENTITY_BYTES,
            });
        }
        Ok(())
    }
}
