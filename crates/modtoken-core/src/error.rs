// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types.

use thiserror::Error;

/// Errors raised while loading or validating a [`TokenizerConfig`](crate::TokenizerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configured identity length is below the entropy floor.
    #[error("[CONFIG_IDENTITY_TOO_SHORT] identity_bytes = {got}, minimum is {min}")]
    IdentityTooShort {
        /// Configured byte count.
        got: usize,
        /// Required minimum.
        min: usize,
    },
    /// Config document could not be parsed.
    #[error("[CONFIG_PARSE] {0}")]
    Parse(#[from] serde_json::Error),
    /// Config file could not be read.
    #[error("[CONFIG_IO] {0}")]
    Io(#[from] std::io::Error),
}
