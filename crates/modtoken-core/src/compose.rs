// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Token records and the hash boundary.

use std::fmt;

use crate::canonical::{enc_text, write_major, EncodedValue};
use crate::ident::ModuleIdentity;

/// Deterministic module token.
///
/// Opaque beyond "equal inputs give equal tokens within one process run".
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Token(String);

impl Token {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the token, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&ModuleIdentity> for Token {
    fn from(id: &ModuleIdentity) -> Self {
        Self(id.as_str().to_owned())
    }
}

/// The hash operation tokens are derived from.
///
/// Must be deterministic for equal input bytes. Inputs are always fully
/// canonicalized upstream, so there is nothing to skip or reject.
pub trait TokenHasher: Send + Sync {
    /// Digest `bytes` into a token.
    fn digest(&self, bytes: &[u8]) -> Token;
}

/// BLAKE3, rendered as 64 lowercase hex characters.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Hasher;

impl TokenHasher for Blake3Hasher {
    fn digest(&self, bytes: &[u8]) -> Token {
        Token(blake3::hash(bytes).to_hex().to_string())
    }
}

/// The record a general-path token is the digest of.
///
/// Field order is fixed: `id`, `module`, `dynamic`.
#[derive(Clone, Copy, Debug)]
pub struct OpaqueTokenRecord<'a> {
    /// Module identity.
    pub id: &'a ModuleIdentity,
    /// Module type name.
    pub module_name: &'a str,
    /// Encoded dynamic metadata, if any.
    pub dynamic: Option<&'a EncodedValue>,
}

impl OpaqueTokenRecord<'_> {
    /// Canonical bytes of the record.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_major(5, 3, &mut out);
        enc_text("id", &mut out);
        enc_text(self.id.as_str(), &mut out);
        enc_text("module", &mut out);
        enc_text(self.module_name, &mut out);
        enc_text("dynamic", &mut out);
        match self.dynamic {
            Some(v) => v.write_to(&mut out),
            None => EncodedValue::Undefined.write_to(&mut out),
        }
        out
    }
}

/// Builds token records and digests them.
#[derive(Clone, Debug, Default)]
pub struct TokenComposer<H> {
    hasher: H,
}

impl<H: TokenHasher> TokenComposer<H> {
    /// Create a composer over `hasher`.
    pub fn new(hasher: H) -> Self {
        Self { hasher }
    }

    /// Token for a module with encoded dynamic metadata.
    pub fn compose(
        &self,
        id: &ModuleIdentity,
        module_name: &str,
        dynamic: Option<&EncodedValue>,
    ) -> Token {
        self.digest_record(&OpaqueTokenRecord {
            id,
            module_name,
            dynamic,
        })
    }

    /// Token for a prepared record.
    pub fn digest_record(&self, record: &OpaqueTokenRecord<'_>) -> Token {
        self.hasher.digest(&record.to_bytes())
    }

    /// Fast-path key for a module without dynamic metadata.
    pub fn fast_key(id: &ModuleIdentity, module_name: &str) -> String {
        format!("{id}_{module_name}")
    }

    /// Token for a module without dynamic metadata: the digest of its fast key.
    pub fn compose_fast(&self, fast_key: &str) -> Token {
        self.hasher.digest(fast_key.as_bytes())
    }

    /// Digest raw bytes with the underlying hasher.
    pub fn digest(&self, bytes: &[u8]) -> Token {
        self.hasher.digest(bytes)
    }

    /// The underlying hasher.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}
