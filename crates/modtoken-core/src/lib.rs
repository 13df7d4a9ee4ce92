// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Module-identity tokenizer.
//!
//! [`ModuleTokenFactory::create`] turns a module type plus optional dynamic
//! metadata into a [`Token`]: equal module definitions get equal tokens, so a DI
//! container can deduplicate module instances across an application graph.
//!
//! # Pipeline
//!
//! 1. Pre-stamped metadata ([`StampedModule`]) returns its own identity.
//! 2. The reserved bootstrap type gets a fresh random token on every call.
//! 3. Every other type gets a process-local random [`ModuleIdentity`] from the
//!    [`IdentityAssigner`], held weakly against the type descriptor.
//! 4. Without metadata, the token is `digest(identity + "_" + name)`.
//! 5. With metadata, the [`CanonicalEncoder`] renders it to an
//!    [`EncodedValue`], the [`TokenComposer`] wraps it in an
//!    [`OpaqueTokenRecord`] and digests the canonical bytes.
//!
//! # Determinism
//!
//! Tokens are deterministic within one process for equal effective inputs.
//! They are not stable across runs: identities are random by construction.
//!
//! # Errors
//!
//! Token creation is infallible. Only configuration loading and validation
//! return [`ConfigError`].
#![forbid(unsafe_code)]

mod cache;
mod canonical;
mod compose;
mod config;
mod ephemeral;
mod error;
mod factory;
mod ident;

pub use cache::{CacheStats, TokenCache};
pub use canonical::{encode, CanonicalEncoder, EncodedValue};
pub use compose::{Blake3Hasher, OpaqueTokenRecord, Token, TokenComposer, TokenHasher};
pub use config::{CachePolicy, TokenizerConfig, MIN_IDENTITY_BYTES};
pub use ephemeral::EphemeralMap;
pub use error::ConfigError;
pub use factory::{DynamicMetadata, ModuleTokenFactory, StampedModule};
pub use ident::{IdentityAssigner, IdentitySource, ModuleIdentity, RandomIdentitySource};

pub use modtoken_value as value;
